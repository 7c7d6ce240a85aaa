//! EventRelay Broker Framework
//!
//! Turns a declarative [`EndpointConfig`] into a live event-publishing
//! broker. Builtin adapters cover the transports the system ships with
//! (AMQP message queue, PostgreSQL, flat file, Kafka); any other type tag is
//! treated as a fully-qualified identifier and resolved through the plugin
//! registry. Identifiers that cannot be resolved degrade to "no broker" with
//! a logged warning rather than an error, so a misconfigured broker never
//! takes the host process down.
//!
//! ## Architecture
//!
//! - **Traits**: `EventBroker` is the contract every adapter implements;
//!   `BrokerFactory` constructs dynamically registered adapters.
//! - **Factory**: `create` / `from_endpoint_config` pick and build the
//!   adapter a configuration asks for.
//! - **Registry**: process-wide table of adapters addressable by
//!   fully-qualified identifier.
//! - **Adapters**: ready-to-use AMQP, SQL, file, and Kafka brokers.

pub mod amqp;
pub mod error;
pub mod factory;
pub mod file;
pub mod kafka;
pub mod registry;
pub mod sql;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use eventrelay_core::{EndpointConfig, Event};

pub use amqp::AmqpBroker;
pub use error::{BrokerError, Result};
pub use factory::{create, from_endpoint_config, BrokerInput, DEFAULT_BROKER_TAG};
pub use file::FileBroker;
pub use kafka::KafkaBroker;
pub use registry::{
    register_broker_factory, register_plugin, registered_types, registry_diagnostics,
    resolve_broker_factory,
};
pub use sql::SqlBroker;
pub use traits::{BrokerFactory, EventBroker};
