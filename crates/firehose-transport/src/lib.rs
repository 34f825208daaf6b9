// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Firehose Transport
//!
//! A logging transport that ships structured log events to an AWS Kinesis
//! Data Firehose delivery stream. The host logging framework hands each
//! event (level, message, optional metadata) to [`FirehoseTransport::log_event`];
//! the transport flattens it into a canonical JSON envelope and puts it on
//! the stream as a single record, retrying transient failures with
//! exponential backoff.
//!
//! ## Architecture
//!
//! ```text
//!   host logging framework
//!           │
//!           v
//!   ┌────────────────┐
//!   │ FirehoseTransport │  log_event(level, message, metadata)
//!   └───────┬────────┘
//!           │
//!           v
//!   ┌────────────────┐
//!   │ EnvelopeBuilder │  top-level / overflow field placement
//!   └───────┬────────┘
//!           │ serialized envelope
//!           v
//!   ┌────────────────┐
//!   │ DeliveryClient │  bounded retry with exponential backoff
//!   └───────┬────────┘
//!           │ one PutRecord per attempt
//!           v
//!   ┌────────────────┐
//!   │  RecordSink    │  Firehose JSON/HTTP API (reqwest)
//!   └────────────────┘
//! ```
//!
//! Delivery failure never propagates to the caller: after the configured
//! attempts are exhausted the record is dropped with an `error!` diagnostic
//! and `log_event` resolves normally. A logging pipeline must not
//! destabilize the application that uses it.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

/// Transport configuration (stream name, field placement, retry policy)
pub mod config;

/// Retry controller around single-record puts
pub mod delivery;

/// Log event flattening into the wire envelope
pub mod envelope;

/// Error types
pub mod error;

/// The `PutRecord` boundary and its reqwest implementation
pub mod firehose;

/// Shared HTTP client construction
pub mod http;

/// Host-framework entry point
pub mod transport;

pub use config::{EndpointConfig, RetryConfig, TransportConfig};
pub use delivery::DeliveryClient;
pub use envelope::{EnvelopeBuilder, Metadata};
pub use error::{DeliveryError, TransportError};
pub use firehose::{FirehoseClient, RecordSink};
pub use transport::FirehoseTransport;
