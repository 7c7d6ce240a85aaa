//! Declarative description of an event broker endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration for one broker endpoint: which adapter to build and the
/// parameters it needs.
///
/// `kind` is the adapter type tag (serialized as `"type"`). Builtin adapters
/// are selected by short tag; any other value is treated as the
/// fully-qualified identifier of a registered adapter. When absent, the
/// message-queue adapter is assumed.
///
/// Everything besides `type` and `url` is collected into `params` untouched;
/// each adapter defines the keys it understands and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Adapter type tag, e.g. `"kafka"` or `"my_plugins.audit.AuditBroker"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Endpoint address: AMQP URI, database URL, Kafka bootstrap servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Adapter-specific parameters, passed through uninterpreted.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl EndpointConfig {
    /// Config selecting the adapter registered under `kind`.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Raw parameter value, if present.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Parameter as a string slice, if present and a string.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Serialization / deserialization
    // ---------------------------------------------------------------

    #[test]
    fn test_type_tag_roundtrip() {
        let config = EndpointConfig::new("kafka")
            .with_url("localhost:9092")
            .with_param("topic", "conversation_events");

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"type\":\"kafka\""));

        let parsed: EndpointConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.kind.as_deref(), Some("kafka"));
    }

    #[test]
    fn test_deserialize_declarative_form() {
        let json = r#"{
            "type": "sql",
            "url": "postgres://localhost/events",
            "table": "conversation_events"
        }"#;

        let config: EndpointConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.kind.as_deref(), Some("sql"));
        assert_eq!(config.url.as_deref(), Some("postgres://localhost/events"));
        assert_eq!(config.param_str("table"), Some("conversation_events"));
    }

    #[test]
    fn test_missing_type_stays_absent() {
        let config: EndpointConfig =
            serde_json::from_str(r#"{"url": "amqp://localhost"}"#).unwrap();
        assert!(config.kind.is_none());
        assert_eq!(config.url.as_deref(), Some("amqp://localhost"));
    }

    // ---------------------------------------------------------------
    // Parameter bag
    // ---------------------------------------------------------------

    #[test]
    fn test_unknown_params_pass_through() {
        let json = r#"{"type": "file", "path": "/var/log/events.jsonl", "mode": "append"}"#;

        let config: EndpointConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.param_str("path"), Some("/var/log/events.jsonl"));
        assert_eq!(config.param_str("mode"), Some("append"));
        assert!(config.param("missing").is_none());
    }

    #[test]
    fn test_non_string_params() {
        let config = EndpointConfig::new("sql").with_param("max_connections", 8);
        assert_eq!(config.param("max_connections"), Some(&Value::from(8)));
        assert!(config.param_str("max_connections").is_none());
    }
}
