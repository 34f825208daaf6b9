// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Retry controller around single-record puts.
//!
//! One `send` call is one logical operation: the record is built once, then
//! put against the sink until it succeeds or the attempt limit is reached.
//! The delay before retry `n` is `initial_delay * backoff_multiplier^(n-1)`,
//! waited out on the tokio timer so concurrent sends are never blocked.
//!
//! Failure is absorbed, not propagated: after attempt exhaustion the record
//! is dropped with an `error!` diagnostic and `send` resolves normally.
//! Callers inside application log paths must never see an error from here.

use crate::config::RetryConfig;
use crate::firehose::RecordSink;
use bytes::Bytes;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error};

/// Delivery client bound to one destination stream.
pub struct DeliveryClient {
    stream_name: String,
    retry: RetryConfig,
    append_newline: bool,
    sink: Arc<dyn RecordSink>,
}

impl DeliveryClient {
    pub fn new(
        stream_name: String,
        retry: RetryConfig,
        append_newline: bool,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            stream_name,
            retry,
            append_newline,
            sink,
        }
    }

    /// Deliver one serialized envelope. Always resolves; never errors.
    pub async fn send(&self, payload: &str) {
        // The record is fixed for the whole call; retries reuse it.
        let mut record = payload.as_bytes().to_vec();
        if self.append_newline {
            record.push(b'\n');
        }
        let record = Bytes::from(record);

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.sink.put_record(&self.stream_name, record.clone()).await {
                Ok(()) => {
                    debug!(
                        "Delivered record to stream {} on attempt {attempts}",
                        self.stream_name
                    );
                    return;
                }
                Err(e) => {
                    if attempts >= self.retry.max_attempts {
                        // Attempt exhaustion: drop the record, keep the caller whole.
                        error!(
                            "Dropping record for stream {} after {attempts} attempts: {e}",
                            self.stream_name
                        );
                        return;
                    }
                    let delay = self.retry.delay_after(attempts);
                    debug!(
                        "Put to stream {} failed on attempt {attempts}: {e}, retrying in {delay:?}",
                        self.stream_name
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
