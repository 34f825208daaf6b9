// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::TransportError;
use serde_json::{Map, Value};
use std::env;
use std::time::Duration;

/// Default adapter instance identifier.
pub const DEFAULT_TRANSPORT_NAME: &str = "WinstonFirehose";

/// Default minimum severity recorded by the transport.
pub const DEFAULT_LEVEL: &str = "info";

/// Default regional Firehose endpoint.
pub const DEFAULT_ENDPOINT_URL: &str = "https://firehose.us-east-1.amazonaws.com";

/// Serialization function applied to the finished envelope.
///
/// The default is plain JSON. The original transport guarded reference
/// cycles with a `"[Circular]"` sentinel; `serde_json::Value` is acyclic,
/// so the sentinel survives only as the fallback emitted if serialization
/// itself fails.
pub type Formatter = fn(&Value) -> String;

pub fn default_formatter(envelope: &Value) -> String {
    serde_json::to_string(envelope).unwrap_or_else(|_| "\"[Circular]\"".to_string())
}

/// Retry policy for the delivery client.
///
/// The delay before retry `n` (1-based attempts) is
/// `initial_delay * backoff_multiplier^(n-1)`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of put attempts per record (must be >= 1)
    pub max_attempts: u32,
    /// Growth factor applied to the delay between attempts (must be >= 1.0)
    pub backoff_multiplier: f64,
    /// Delay before the first retry
    pub initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            backoff_multiplier: 2.0,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    /// Delay to wait after `failed_attempts` consecutive failures.
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1);
        self.initial_delay
            .mul_f64(self.backoff_multiplier.powi(exponent.try_into().unwrap_or(i32::MAX)))
    }
}

/// Connection options for the Firehose HTTP endpoint.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Base URL of the Firehose JSON API
    pub url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Extra headers attached to every request (e.g. set by a fronting
    /// proxy or agent that handles request signing)
    pub extra_headers: Vec<(String, String)>,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT_URL.to_string(),
            timeout: Duration::from_secs(5),
            extra_headers: Vec::new(),
            https_proxy: None,
        }
    }
}

/// Configuration for one transport instance.
///
/// Constructed once, read-only thereafter; concurrent log events share it
/// without synchronization.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Adapter instance identifier
    pub name: String,
    /// Minimum severity (filtering itself is the host framework's job)
    pub level: String,
    /// Field names kept at the envelope root; everything else is nested
    /// under `meta`
    pub top_level_attributes: Vec<String>,
    /// Fields merged into every envelope, overriding all event fields
    pub constants: Map<String, Value>,
    /// Envelope serialization function
    pub formatter: Formatter,
    /// Firehose delivery stream the records are written to
    pub stream_name: String,
    /// Endpoint connection options
    pub endpoint: EndpointConfig,
    /// Retry policy for the delivery client
    pub retry: RetryConfig,
    /// Append a trailing newline to each record so the consumer can split
    /// the stream back into discrete records
    pub append_newline: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TRANSPORT_NAME.to_string(),
            level: DEFAULT_LEVEL.to_string(),
            top_level_attributes: vec![
                "level".to_string(),
                "message".to_string(),
                "timestamp".to_string(),
            ],
            constants: Map::new(),
            formatter: default_formatter,
            stream_name: String::new(),
            endpoint: EndpointConfig::default(),
            retry: RetryConfig::default(),
            append_newline: true,
        }
    }
}

impl TransportConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, TransportError> {
        let stream_name = env::var("FIREHOSE_STREAM_NAME").unwrap_or_default();
        let url =
            env::var("FIREHOSE_ENDPOINT_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT_URL.to_string());
        let level = env::var("FIREHOSE_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
        let max_attempts = env::var("FIREHOSE_MAX_ATTEMPTS")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(4);
        let https_proxy = env::var("HTTPS_PROXY").ok();

        let config = Self {
            level,
            stream_name,
            endpoint: EndpointConfig {
                url,
                https_proxy,
                ..EndpointConfig::default()
            },
            retry: RetryConfig {
                max_attempts,
                ..RetryConfig::default()
            },
            ..Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.stream_name.trim().is_empty() {
            return Err(TransportError::InvalidConfig(
                "stream name cannot be empty".to_string(),
            ));
        }

        if self.endpoint.url.trim().is_empty() {
            return Err(TransportError::InvalidConfig(
                "endpoint URL cannot be empty".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(TransportError::InvalidConfig(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err(TransportError::InvalidConfig(
                "retry backoff_multiplier must be at least 1.0".to_string(),
            ));
        }

        Ok(())
    }
}
