//! The broker factory: turn an endpoint configuration into a live broker.
//!
//! [`create`] accepts an already-built broker, an endpoint configuration, or
//! nothing. A configuration names a builtin adapter by short tag or a
//! registered adapter by fully-qualified identifier. Identifiers that cannot
//! be resolved degrade to "no broker" with a logged warning; construction
//! failures from a resolved adapter propagate to the caller.

use eventrelay_core::EndpointConfig;

use crate::amqp::AmqpBroker;
use crate::error::Result;
use crate::file::FileBroker;
use crate::kafka::KafkaBroker;
use crate::registry::resolve_broker_factory;
use crate::sql::SqlBroker;
use crate::traits::EventBroker;

/// Tag assumed when a configuration does not declare one.
pub const DEFAULT_BROKER_TAG: &str = "pika";

/// Input to [`create`]: a broker that already exists, or the configuration
/// to build one from.
pub enum BrokerInput {
    /// Pass an existing broker through unchanged.
    Ready(Box<dyn EventBroker>),
    /// Build a broker from this configuration.
    FromConfig(EndpointConfig),
}

impl From<Box<dyn EventBroker>> for BrokerInput {
    fn from(broker: Box<dyn EventBroker>) -> Self {
        BrokerInput::Ready(broker)
    }
}

impl From<EndpointConfig> for BrokerInput {
    fn from(config: EndpointConfig) -> Self {
        BrokerInput::FromConfig(config)
    }
}

/// Builtin adapters, selectable by short tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    MessageQueue,
    Sql,
    File,
    Kafka,
}

/// Case-insensitive builtin lookup. Unrecognized tags go to the registry.
fn builtin_for_tag(tag: &str) -> Option<Builtin> {
    match tag.to_ascii_lowercase().as_str() {
        "pika" => Some(Builtin::MessageQueue),
        "sql" => Some(Builtin::Sql),
        "file" => Some(Builtin::File),
        "kafka" => Some(Builtin::Kafka),
        _ => None,
    }
}

/// Create an event broker.
///
/// Returns `Ok(None)` when `input` is absent or when a dynamically named
/// broker type cannot be resolved (the failure is logged, never raised).
/// Construction errors from a resolved adapter are returned unchanged.
///
/// The factory holds no state: every call resolves independently and
/// ownership of the returned broker moves to the caller.
pub async fn create(input: Option<BrokerInput>) -> Result<Option<Box<dyn EventBroker>>> {
    match input {
        None => Ok(None),
        Some(BrokerInput::Ready(broker)) => Ok(Some(broker)),
        Some(BrokerInput::FromConfig(config)) => from_endpoint_config(&config).await,
    }
}

/// Build a broker from an endpoint configuration.
///
/// An absent `type` tag selects the message-queue adapter.
pub async fn from_endpoint_config(
    config: &EndpointConfig,
) -> Result<Option<Box<dyn EventBroker>>> {
    let tag = config.kind.as_deref().unwrap_or(DEFAULT_BROKER_TAG);

    let broker: Box<dyn EventBroker> = match builtin_for_tag(tag) {
        Some(Builtin::MessageQueue) => Box::new(AmqpBroker::from_endpoint_config(config).await?),
        Some(Builtin::Sql) => Box::new(SqlBroker::from_endpoint_config(config).await?),
        Some(Builtin::File) => Box::new(FileBroker::from_endpoint_config(config).await?),
        Some(Builtin::Kafka) => Box::new(KafkaBroker::from_endpoint_config(config).await?),
        None => return load_dynamic(tag, config).await,
    };

    Ok(Some(broker))
}

/// Resolve and build a dynamically named broker type.
///
/// The identifier is matched verbatim; only builtin tags are
/// case-normalized.
async fn load_dynamic(
    type_name: &str,
    config: &EndpointConfig,
) -> Result<Option<Box<dyn EventBroker>>> {
    let factory = match resolve_broker_factory(type_name) {
        Ok(factory) => factory,
        Err(err) if err.is_unresolved() => {
            tracing::warn!(
                broker_type = %type_name,
                error = %err,
                "event broker type could not be resolved, not using any event broker"
            );
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    Ok(Some(factory.build(config).await?))
}
