//! Log-structured stream broker backed by Kafka.
//!
//! Each event becomes one JSON record on a single topic. The producer is
//! created eagerly; librdkafka establishes broker connectivity lazily, so
//! bad parameters fail at construction and unreachable brokers fail on
//! publish.
//!
//! ## Configuration
//!
//! | Key                  | Description                         | Default      |
//! |----------------------|-------------------------------------|--------------|
//! | `url`                | Bootstrap servers                   | required     |
//! | `topic`              | Target topic                        | `events`     |
//! | `client_id`          | Producer client id                  | (librdkafka) |
//! | `security_protocol`  | PLAINTEXT, SSL, SASL_SSL, ...       | `PLAINTEXT`  |
//! | `sasl_mechanism`     | SASL mechanism, e.g. PLAIN          | (none)       |
//! | `sasl_username`      | SASL username                       | (none)       |
//! | `sasl_password`      | SASL password                       | (none)       |
//! | `ssl_ca_location`    | CA certificate path                 | (none)       |
//! | `key_field`          | Event field used as the record key  | (none)       |
//! | `message_timeout_ms` | Delivery timeout                    | `5000`       |

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use serde::Deserialize;
use serde_json::Value;

use eventrelay_core::{EndpointConfig, Event};

use crate::error::{BrokerError, Result};
use crate::traits::EventBroker;

fn default_topic() -> String {
    "events".to_string()
}

fn default_security_protocol() -> String {
    "PLAINTEXT".to_string()
}

fn default_message_timeout_ms() -> u64 {
    5000
}

/// Parsed configuration for the Kafka broker.
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaParams {
    /// Topic every event is produced to.
    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default = "default_security_protocol")]
    pub security_protocol: String,

    #[serde(default)]
    pub sasl_mechanism: Option<String>,

    #[serde(default)]
    pub sasl_username: Option<String>,

    #[serde(default)]
    pub sasl_password: Option<String>,

    #[serde(default)]
    pub ssl_ca_location: Option<String>,

    /// When set, the record key is taken from this event field, so events
    /// sharing the field value land on the same partition.
    #[serde(default)]
    pub key_field: Option<String>,

    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,
}

impl KafkaParams {
    /// Parse broker parameters from the endpoint's parameter bag.
    pub fn from_endpoint_config(config: &EndpointConfig) -> Result<Self> {
        serde_json::from_value(Value::Object(config.params.clone()))
            .map_err(|e| BrokerError::ConfigError(format!("invalid kafka parameters: {}", e)))
    }

    /// Assemble the librdkafka client configuration.
    pub fn to_client_config(&self, bootstrap_servers: &str) -> ClientConfig {
        let mut rdk = ClientConfig::new();
        rdk.set("bootstrap.servers", bootstrap_servers);
        rdk.set("security.protocol", &self.security_protocol);
        rdk.set("message.timeout.ms", self.message_timeout_ms.to_string());

        if let Some(ref client_id) = self.client_id {
            rdk.set("client.id", client_id);
        }
        if let Some(ref mechanism) = self.sasl_mechanism {
            rdk.set("sasl.mechanism", mechanism);
        }
        if let Some(ref username) = self.sasl_username {
            rdk.set("sasl.username", username);
        }
        if let Some(ref password) = self.sasl_password {
            rdk.set("sasl.password", password);
        }
        if let Some(ref ca_location) = self.ssl_ca_location {
            rdk.set("ssl.ca.location", ca_location);
        }

        rdk
    }

    /// Record key for an event, when a key field is configured.
    fn record_key(&self, event: &Event) -> Option<String> {
        let field = self.key_field.as_deref()?;
        match event.get(field)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Log-structured stream event broker.
pub struct KafkaBroker {
    params: KafkaParams,
    producer: FutureProducer,
}

impl KafkaBroker {
    /// Create the producer from the endpoint configuration.
    pub async fn from_endpoint_config(config: &EndpointConfig) -> Result<Self> {
        let params = KafkaParams::from_endpoint_config(config)?;
        let bootstrap = config.url.as_deref().ok_or_else(|| {
            BrokerError::ConfigError(
                "missing required 'url' (bootstrap servers) for the kafka broker".to_string(),
            )
        })?;

        let producer: FutureProducer =
            params.to_client_config(bootstrap).create().map_err(|e| {
                BrokerError::ConnectionError(format!("kafka producer creation failed: {}", e))
            })?;

        tracing::info!(topic = %params.topic, bootstrap = %bootstrap, "kafka event broker ready");

        Ok(Self { params, producer })
    }
}

#[async_trait]
impl EventBroker for KafkaBroker {
    fn kind(&self) -> &str {
        "kafka"
    }

    async fn publish(&mut self, event: &Event) -> Result<()> {
        let payload = serde_json::to_vec(event)?;
        let timestamp = Utc::now().timestamp_millis();

        let delivery = match self.params.record_key(event) {
            Some(ref key) => {
                let record = FutureRecord::to(&self.params.topic)
                    .payload(&payload)
                    .key(key)
                    .timestamp(timestamp);
                self.producer.send(record, Timeout::Never).await
            }
            None => {
                let record = FutureRecord::<str, _>::to(&self.params.topic)
                    .payload(&payload)
                    .timestamp(timestamp);
                self.producer.send(record, Timeout::Never).await
            }
        };

        delivery.map_err(|(e, _)| {
            BrokerError::PublishError(format!(
                "kafka delivery to '{}' failed: {}",
                self.params.topic, e
            ))
        })?;

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.producer
            .flush(Timeout::After(Duration::from_secs(5)))
            .map_err(|e| BrokerError::PublishError(format!("kafka flush failed: {}", e)))?;
        Ok(())
    }
}
