// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The "put single record" boundary.
//!
//! [`RecordSink`] is the seam between the retry controller and the remote
//! ingestion endpoint. The production implementation speaks the Firehose
//! JSON/HTTP API; tests substitute their own sink to count attempts.
//!
//! Request signing is not handled here. Deployments that need SigV4 put a
//! signing proxy or agent in front of the endpoint and attach whatever
//! static headers it requires via [`EndpointConfig::extra_headers`].

use crate::config::EndpointConfig;
use crate::error::DeliveryError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;

const PUT_RECORD_TARGET: &str = "Firehose_20150804.PutRecord";
const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// One remote write of a single record to a named delivery stream.
///
/// Every error is retryable from the caller's point of view; implementations
/// do not classify failures.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn put_record(&self, stream_name: &str, data: Bytes) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PutRecordRequest<'a> {
    delivery_stream_name: &'a str,
    record: FirehoseRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct FirehoseRecord {
    data: String,
}

/// Firehose API client for single-record puts.
///
/// Holds the shared pooled HTTP client; cheap to clone.
#[derive(Debug, Clone)]
pub struct FirehoseClient {
    client: reqwest::Client,
    endpoint: EndpointConfig,
}

impl FirehoseClient {
    pub fn new(client: reqwest::Client, endpoint: EndpointConfig) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl RecordSink for FirehoseClient {
    async fn put_record(&self, stream_name: &str, data: Bytes) -> Result<(), DeliveryError> {
        let body = PutRecordRequest {
            delivery_stream_name: stream_name,
            record: FirehoseRecord {
                data: BASE64.encode(&data),
            },
        };

        let mut request = self
            .client
            .post(&self.endpoint.url)
            .timeout(self.endpoint.timeout)
            .header("X-Amz-Target", PUT_RECORD_TARGET)
            .header("Content-Type", AMZ_JSON_CONTENT_TYPE)
            .json(&body);
        for (name, value) in &self.endpoint.extra_headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(DeliveryError::Endpoint {
            status,
            body: response.text().await.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_record_request_shape() {
        let body = PutRecordRequest {
            delivery_stream_name: "test-stream",
            record: FirehoseRecord {
                data: BASE64.encode(b"{\"level\":\"info\"}\n"),
            },
        };
        let serialized = serde_json::to_value(&body).expect("serializable");
        assert_eq!(serialized["DeliveryStreamName"], "test-stream");
        let encoded = serialized["Record"]["Data"].as_str().expect("Data string");
        let decoded = BASE64.decode(encoded).expect("valid base64");
        assert_eq!(decoded, b"{\"level\":\"info\"}\n");
    }
}
