// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors that can occur when constructing or configuring the transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A single failed put attempt against the record sink.
///
/// Consumed by the retry loop in [`crate::delivery::DeliveryClient`]; never
/// crosses the public `send`/`log_event` boundary. Every variant is treated
/// as retryable, with no distinction between throttling, validation, or
/// connectivity failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Endpoint {
        status: reqwest::StatusCode,
        body: String,
    },
}
