//! AMQP message-queue broker, the default event broker.
//!
//! Publishes each event as a persistent JSON message to one or more durable
//! queues via the default exchange. Selected by the `pika` tag (the
//! historical name of this transport in configuration files) or by omitting
//! the tag entirely.
//!
//! ## Configuration
//!
//! | Key      | Description                             | Default                     |
//! |----------|-----------------------------------------|-----------------------------|
//! | `url`    | AMQP URI                                | `amqp://127.0.0.1:5672/%2f` |
//! | `queues` | Queues to declare and publish events to | `["events"]`                |

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use serde::Deserialize;
use serde_json::Value;

use eventrelay_core::{EndpointConfig, Event};

use crate::error::{BrokerError, Result};
use crate::traits::EventBroker;

const DEFAULT_AMQP_URL: &str = "amqp://127.0.0.1:5672/%2f";

fn default_queues() -> Vec<String> {
    vec!["events".to_string()]
}

/// Parsed configuration for the AMQP broker.
#[derive(Debug, Clone, Deserialize)]
pub struct AmqpParams {
    /// Queues to declare (durable) and publish every event to.
    #[serde(default = "default_queues")]
    pub queues: Vec<String>,
}

impl Default for AmqpParams {
    fn default() -> Self {
        Self {
            queues: default_queues(),
        }
    }
}

impl AmqpParams {
    /// Parse broker parameters from the endpoint's parameter bag.
    pub fn from_endpoint_config(config: &EndpointConfig) -> Result<Self> {
        serde_json::from_value(Value::Object(config.params.clone())).map_err(|e| {
            BrokerError::ConfigError(format!("invalid message queue parameters: {}", e))
        })
    }
}

/// The default message-queue event broker.
pub struct AmqpBroker {
    params: AmqpParams,
    connection: Connection,
    channel: Channel,
}

impl AmqpBroker {
    /// Connect, open a channel, and declare the configured queues.
    pub async fn from_endpoint_config(config: &EndpointConfig) -> Result<Self> {
        let params = AmqpParams::from_endpoint_config(config)?;
        let url = config.url.as_deref().unwrap_or(DEFAULT_AMQP_URL);

        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| {
                BrokerError::ConnectionError(format!("AMQP connect to '{}' failed: {}", url, e))
            })?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| BrokerError::ConnectionError(format!("AMQP channel open failed: {}", e)))?;

        for queue in &params.queues {
            channel
                .queue_declare(
                    queue,
                    QueueDeclareOptions {
                        durable: true,
                        ..QueueDeclareOptions::default()
                    },
                    FieldTable::default(),
                )
                .await
                .map_err(|e| {
                    BrokerError::ConnectionError(format!(
                        "AMQP queue declare '{}' failed: {}",
                        queue, e
                    ))
                })?;
        }

        tracing::info!(url = %url, queues = ?params.queues, "AMQP event broker connected");

        Ok(Self {
            params,
            connection,
            channel,
        })
    }
}

#[async_trait]
impl EventBroker for AmqpBroker {
    fn kind(&self) -> &str {
        "pika"
    }

    async fn publish(&mut self, event: &Event) -> Result<()> {
        let payload = serde_json::to_vec(event)?;
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(2);

        for queue in &self.params.queues {
            self.channel
                .basic_publish(
                    "",
                    queue,
                    BasicPublishOptions::default(),
                    &payload,
                    properties.clone(),
                )
                .await
                .map_err(|e| {
                    BrokerError::PublishError(format!("AMQP publish to '{}' failed: {}", queue, e))
                })?
                .await
                .map_err(|e| {
                    BrokerError::PublishError(format!("AMQP confirm on '{}' failed: {}", queue, e))
                })?;
        }

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.connection
            .close(200, "closing")
            .await
            .map_err(|e| BrokerError::ConnectionError(format!("AMQP close failed: {}", e)))?;
        Ok(())
    }
}
