// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Flattens one log event into the wire envelope.
//!
//! Every envelope carries `timestamp`, the configured top-level fields, and
//! exactly one `meta` object holding everything else. Field placement is
//! controlled solely by the configured `top_level_attributes` list;
//! `level`, `message`, and `timestamp` get no special exemption, so a list
//! that omits them demotes them into `meta` like any other field.
//!
//! Merge precedence, lowest to highest: generated timestamp, caller
//! metadata, `level`/`message`, configured constants.

use crate::config::Formatter;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Caller-supplied metadata, classified once at the transport boundary.
#[derive(Debug, Clone)]
pub enum Metadata {
    Absent,
    Scalar(Value),
    Sequence(Vec<Value>),
    Mapping(Map<String, Value>),
}

impl Metadata {
    /// Classify a raw JSON value. `None` and JSON `null` are both absent.
    pub fn classify(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Object(fields)) => Self::Mapping(fields),
            Some(Value::Array(items)) => Self::Sequence(items),
            Some(scalar) => Self::Scalar(scalar),
        }
    }
}

/// Builds serialized envelopes for one transport instance.
///
/// Pure apart from the timestamp read; no I/O, no state beyond
/// configuration.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    top_level_attributes: Vec<String>,
    constants: Map<String, Value>,
    formatter: Formatter,
}

impl EnvelopeBuilder {
    pub fn new(
        top_level_attributes: Vec<String>,
        constants: Map<String, Value>,
        formatter: Formatter,
    ) -> Self {
        Self {
            top_level_attributes,
            constants,
            formatter,
        }
    }

    /// Build and serialize the envelope for one event.
    pub fn build(&self, level: &str, message: &str, metadata: Metadata) -> String {
        let mut envelope = Map::new();
        envelope.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        match metadata {
            Metadata::Absent => {}
            Metadata::Mapping(fields) => {
                for (key, value) in fields {
                    envelope.insert(key, value);
                }
            }
            // Malformed metadata is recovered, never raised: route the
            // value into the meta slot, where the wrap below preserves it
            // under `meta.meta`.
            Metadata::Scalar(value) => {
                envelope.insert("meta".to_string(), value);
            }
            Metadata::Sequence(items) => {
                envelope.insert("meta".to_string(), Value::Array(items));
            }
        }

        envelope.insert("level".to_string(), Value::String(level.to_string()));
        envelope.insert("message".to_string(), Value::String(message.to_string()));

        // Constants win over everything, including level/message/timestamp.
        for (key, value) in &self.constants {
            envelope.insert(key.clone(), value.clone());
        }

        // Normalize the meta slot: always present, always an object. A
        // caller-supplied `meta` that is not a plain object is preserved
        // under `meta.meta` instead of being overwritten by the overflow
        // bucket.
        let mut meta = match envelope.remove("meta") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(fields)) => fields,
            Some(other) => {
                let mut wrapped = Map::new();
                wrapped.insert("meta".to_string(), other);
                wrapped
            }
        };

        // Sweep: anything not configured as top-level moves under meta.
        let keys: Vec<String> = envelope.keys().cloned().collect();
        for key in keys {
            if !self.top_level_attributes.iter().any(|attr| attr == &key) {
                if let Some(value) = envelope.remove(&key) {
                    meta.insert(key, value);
                }
            }
        }
        envelope.insert("meta".to_string(), Value::Object(meta));

        (self.formatter)(&Value::Object(envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_formatter;
    use proptest::prelude::*;
    use serde_json::json;

    fn default_attributes() -> Vec<String> {
        vec![
            "level".to_string(),
            "message".to_string(),
            "timestamp".to_string(),
        ]
    }

    fn builder(attributes: Vec<String>, constants: Map<String, Value>) -> EnvelopeBuilder {
        EnvelopeBuilder::new(attributes, constants, default_formatter)
    }

    fn build_parsed(
        builder: &EnvelopeBuilder,
        level: &str,
        message: &str,
        metadata: Option<Value>,
    ) -> Map<String, Value> {
        let serialized = builder.build(level, message, Metadata::classify(metadata));
        match serde_json::from_str(&serialized).expect("envelope is valid JSON") {
            Value::Object(fields) => fields,
            other => panic!("envelope root is not an object: {other:?}"),
        }
    }

    #[test]
    fn test_default_format() {
        let envelope = build_parsed(
            &builder(default_attributes(), Map::new()),
            "info",
            "some message",
            None,
        );
        assert_eq!(envelope["level"], "info");
        assert_eq!(envelope["message"], "some message");
        assert!(envelope["timestamp"].is_string());
        assert_eq!(envelope["meta"], json!({}));
    }

    #[test]
    fn test_absent_metadata_yields_empty_meta() {
        let envelope = build_parsed(
            &builder(default_attributes(), Map::new()),
            "info",
            "message",
            Some(Value::Null),
        );
        assert_eq!(envelope["meta"], json!({}));
    }

    #[test]
    fn test_meta_attribute_assignment() {
        let attributes = vec![
            "message".to_string(),
            "level".to_string(),
            "method".to_string(),
            "timestamp".to_string(),
            "foo".to_string(),
        ];
        let envelope = build_parsed(
            &builder(attributes, Map::new()),
            "info",
            "some message",
            Some(json!({
                "something": "someValue",
                "foo": "bar",
                "req": {"statusCode": 400, "params": "?foo=bar"},
            })),
        );

        assert_eq!(envelope["foo"], "bar");
        assert_eq!(envelope["meta"]["something"], "someValue");
        assert_eq!(envelope["meta"]["req"]["statusCode"], 400);
        assert_eq!(envelope["meta"]["req"]["params"], "?foo=bar");
        assert!(envelope.get("something").is_none());
        assert!(envelope.get("req").is_none());
    }

    #[test]
    fn test_reserved_meta_key_is_preserved() {
        let attributes = vec![
            "message".to_string(),
            "level".to_string(),
            "timestamp".to_string(),
            "foo".to_string(),
        ];
        let envelope = build_parsed(
            &builder(attributes, Map::new()),
            "info",
            "message",
            Some(json!({"meta": "metaValue", "foo": "bar"})),
        );

        assert_eq!(envelope["foo"], "bar");
        assert!(envelope["meta"].is_object());
        assert_eq!(envelope["meta"]["meta"], "metaValue");
    }

    #[test]
    fn test_caller_meta_object_is_kept() {
        let envelope = build_parsed(
            &builder(default_attributes(), Map::new()),
            "info",
            "message",
            Some(json!({"meta": {"request_id": "abc-123"}})),
        );
        assert_eq!(envelope["meta"]["request_id"], "abc-123");
    }

    #[test]
    fn test_caller_meta_sequence_is_wrapped() {
        let envelope = build_parsed(
            &builder(default_attributes(), Map::new()),
            "info",
            "message",
            Some(json!({"meta": [1, 2, 3]})),
        );
        assert_eq!(envelope["meta"]["meta"], json!([1, 2, 3]));
    }

    #[test]
    fn test_scalar_metadata_recovered_under_meta() {
        let envelope = build_parsed(
            &builder(default_attributes(), Map::new()),
            "info",
            "message",
            Some(json!("just a string")),
        );
        assert_eq!(envelope["meta"]["meta"], "just a string");
    }

    #[test]
    fn test_constants_override_and_overflow() {
        let attributes = vec![
            "message".to_string(),
            "level".to_string(),
            "timestamp".to_string(),
            "app".to_string(),
            "version".to_string(),
        ];
        let mut constants = Map::new();
        constants.insert("app".to_string(), json!("myApp"));
        constants.insert("version".to_string(), json!("1.0.1"));
        constants.insert("someMeta".to_string(), json!("foobar"));

        let envelope = build_parsed(
            &builder(attributes, constants),
            "info",
            "message",
            Some(json!({"meta": "attributes", "app": "fromMetadata"})),
        );

        // constants at top level, overriding same-named metadata
        assert_eq!(envelope["app"], "myApp");
        assert_eq!(envelope["version"], "1.0.1");

        // constants not listed as top-level overflow into meta
        assert!(envelope.get("someMeta").is_none());
        assert_eq!(envelope["meta"]["someMeta"], "foobar");
    }

    #[test]
    fn test_constants_override_level_and_message() {
        let mut constants = Map::new();
        constants.insert("level".to_string(), json!("forced"));
        constants.insert("message".to_string(), json!("forced message"));

        let envelope = build_parsed(
            &builder(default_attributes(), constants),
            "info",
            "original message",
            None,
        );
        assert_eq!(envelope["level"], "forced");
        assert_eq!(envelope["message"], "forced message");
    }

    #[test]
    fn test_no_implicit_exemption_for_required_fields() {
        // level/message/timestamp are demoted like any other field when the
        // configured list omits them.
        let attributes = vec!["message".to_string()];
        let envelope = build_parsed(&builder(attributes, Map::new()), "info", "message", None);

        assert_eq!(envelope["message"], "message");
        assert!(envelope.get("level").is_none());
        assert!(envelope.get("timestamp").is_none());
        assert_eq!(envelope["meta"]["level"], "info");
        assert!(envelope["meta"]["timestamp"].is_string());
    }

    #[test]
    fn test_metadata_overrides_timestamp() {
        let envelope = build_parsed(
            &builder(default_attributes(), Map::new()),
            "info",
            "message",
            Some(json!({"timestamp": "2020-01-01T00:00:00.000Z"})),
        );
        assert_eq!(envelope["timestamp"], "2020-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_timestamp_is_iso8601() {
        let envelope = build_parsed(
            &builder(default_attributes(), Map::new()),
            "info",
            "message",
            None,
        );
        let timestamp = envelope["timestamp"].as_str().expect("timestamp string");
        let parsed = chrono::DateTime::parse_from_rfc3339(timestamp);
        assert!(parsed.is_ok(), "not ISO-8601: {timestamp}");
        assert!(timestamp.ends_with('Z'));
    }

    proptest! {
        // Every merged key is either configured top-level (and stays at the
        // root) or lands under meta; the root never holds anything else.
        #[test]
        fn prop_partition_into_root_and_meta(
            metadata in proptest::collection::hash_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..8),
            top_level in proptest::collection::hash_set("[a-z]{1,8}", 0..4),
        ) {
            let attributes: Vec<String> = top_level.iter().cloned().collect();
            let meta_value = Value::Object(
                metadata
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            );
            let envelope = build_parsed(
                &builder(attributes, Map::new()),
                "info",
                "message",
                Some(meta_value),
            );

            for key in envelope.keys() {
                prop_assert!(
                    key == "meta" || top_level.contains(key),
                    "unexpected root key {key}"
                );
            }

            let meta = envelope["meta"].as_object().expect("meta is an object");
            for key in metadata.keys() {
                if key == "meta" {
                    // reserved; covered by the wrap tests above
                    continue;
                }
                if top_level.contains(key) {
                    prop_assert!(envelope.contains_key(key));
                    prop_assert!(!meta.contains_key(key));
                } else {
                    prop_assert!(meta.contains_key(key));
                    prop_assert!(!envelope.contains_key(key));
                }
            }
        }
    }
}
