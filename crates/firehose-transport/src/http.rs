// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared HTTP client construction.
//!
//! The client is built once per transport instance and injected into the
//! Firehose client; concurrent `send` calls reuse its connection pool.
//! Idle connections are kept alive between puts so steady log traffic does
//! not pay a handshake per event.

use crate::config::EndpointConfig;
use std::time::Duration;
use tracing::error;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const TCP_KEEPALIVE: Duration = Duration::from_secs(60);

/// Creates the pooled HTTP client for an endpoint.
///
/// If the endpoint options are invalid (for example a malformed proxy URL),
/// logs an error and returns a default client so the transport can keep
/// operating.
#[must_use]
pub fn get_client(endpoint: &EndpointConfig) -> reqwest::Client {
    match build_client(endpoint) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create HTTP client: {e}, using default");
            reqwest::Client::new()
        }
    }
}

fn build_client(endpoint: &EndpointConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .timeout(endpoint.timeout)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .tcp_keepalive(TCP_KEEPALIVE);

    if let Some(https_proxy) = &endpoint.https_proxy {
        builder = builder.proxy(reqwest::Proxy::https(https_proxy)?);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_client_default_endpoint() {
        let client = get_client(&EndpointConfig::default());
        // A pooled client is returned; actual connectivity is exercised by
        // the integration tests.
        let _ = client;
    }

    #[test]
    fn test_get_client_bad_proxy_falls_back() {
        let endpoint = EndpointConfig {
            https_proxy: Some("not a proxy url".to_string()),
            ..EndpointConfig::default()
        };
        // Must not panic; falls back to a default client.
        let _ = get_client(&endpoint);
    }
}
