// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Host-framework entry point.
//!
//! The host logging framework does level filtering and calls
//! [`FirehoseTransport::log_event`] once per accepted event. The returned
//! future settles when the event has been accepted by the stream or
//! dropped after attempt exhaustion; either way it resolves normally.

use crate::config::TransportConfig;
use crate::delivery::DeliveryClient;
use crate::envelope::{EnvelopeBuilder, Metadata};
use crate::error::TransportError;
use crate::firehose::{FirehoseClient, RecordSink};
use crate::http;
use serde_json::Value;
use std::sync::Arc;

/// One transport instance: envelope builder plus delivery client, bound to
/// one delivery stream.
pub struct FirehoseTransport {
    name: String,
    level: String,
    envelope: EnvelopeBuilder,
    delivery: DeliveryClient,
}

impl FirehoseTransport {
    /// Build a transport with the production Firehose sink. The pooled HTTP
    /// client is constructed once here and shared by every `log_event`.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = http::get_client(&config.endpoint);
        let sink = Arc::new(FirehoseClient::new(client, config.endpoint.clone()));
        Self::with_sink(config, sink)
    }

    /// Build a transport around an injected record sink.
    pub fn with_sink(
        config: TransportConfig,
        sink: Arc<dyn RecordSink>,
    ) -> Result<Self, TransportError> {
        config.validate()?;
        Ok(Self {
            name: config.name,
            level: config.level,
            envelope: EnvelopeBuilder::new(
                config.top_level_attributes,
                config.constants,
                config.formatter,
            ),
            delivery: DeliveryClient::new(
                config.stream_name,
                config.retry,
                config.append_newline,
                sink,
            ),
        })
    }

    /// Ship one log event. Always resolves; delivery failure is retried and
    /// then absorbed, never surfaced to the application's log call site.
    pub async fn log_event(&self, level: &str, message: &str, metadata: Option<Value>) {
        let envelope = self
            .envelope
            .build(level, message, Metadata::classify(metadata));
        self.delivery.send(&envelope).await;
    }

    /// Adapter instance identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured minimum severity. Filtering against it is the host
    /// framework's responsibility.
    pub fn level(&self) -> &str {
        &self.level
    }
}
