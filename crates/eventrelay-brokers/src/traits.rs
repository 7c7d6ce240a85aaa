//! Broker traits for the event relay framework.
//!
//! Defines the core `EventBroker` contract that all adapter implementations
//! must satisfy, along with the `BrokerFactory` contract used for adapters
//! resolved by fully-qualified name at runtime.

use async_trait::async_trait;

use eventrelay_core::{EndpointConfig, Event};

use crate::error::Result;

/// Trait that all event brokers must implement.
///
/// A broker accepts a structured event record and hands it to a downstream
/// transport (message queue, database, file, stream). How the transport
/// batches, retries, or acknowledges is the adapter's business, not the
/// caller's.
#[async_trait]
pub trait EventBroker: Send + Sync {
    /// Short tag identifying the adapter, e.g. `"kafka"`.
    fn kind(&self) -> &str;

    /// Publish one event to the transport.
    async fn publish(&mut self, event: &Event) -> Result<()>;

    /// Release transport resources (connections, file handles).
    ///
    /// Called by the owner when it is done with the broker. Publishing after
    /// close is adapter-defined. Defaults to a no-op.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Constructor contract for brokers resolved by fully-qualified name.
///
/// Builtin adapters are constructed directly by the factory; everything else
/// goes through a `BrokerFactory` registered in the plugin registry.
#[async_trait]
pub trait BrokerFactory: Send + Sync {
    /// Fully-qualified identifier this factory is registered under.
    fn type_name(&self) -> &str;

    /// Build a broker from the endpoint configuration.
    ///
    /// Must either return a usable broker or an error; never a broker that
    /// silently drops events.
    async fn build(&self, config: &EndpointConfig) -> Result<Box<dyn EventBroker>>;
}
