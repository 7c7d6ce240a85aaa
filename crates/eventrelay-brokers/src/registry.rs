//! Process-wide registry for dynamically named broker types.
//!
//! Builtin adapters are compiled into the factory's dispatch table; anything
//! addressed by a fully-qualified identifier is looked up here. Entries are
//! type-erased so the registry can hold extension points other than broker
//! factories; resolving a broker factory verifies the entry actually provides
//! the [`BrokerFactory`] contract.

use once_cell::sync::OnceCell;
use std::any::Any;
use std::collections::HashMap;
use std::panic::Location;
use std::sync::{Arc, RwLock};

use crate::error::{BrokerError, Result};
use crate::traits::BrokerFactory;

/// A registered plugin object plus the source location that registered it.
type PluginRec = (Box<dyn Any + Send + Sync>, &'static Location<'static>);
type PluginReg = RwLock<HashMap<String, PluginRec>>;

static PLUGINS: OnceCell<PluginReg> = OnceCell::new();

fn plugin_reg() -> &'static PluginReg {
    PLUGINS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a broker factory under its own `type_name`.
///
/// Identifiers are matched case-sensitively at resolution time. A later
/// registration under the same identifier replaces the earlier one.
#[track_caller]
pub fn register_broker_factory<F>(factory: F)
where
    F: BrokerFactory + 'static,
{
    let factory: Arc<dyn BrokerFactory> = Arc::new(factory);
    let type_name = factory.type_name().to_string();
    register_plugin(type_name, Box::new(factory));
}

/// Register an arbitrary plugin object under a fully-qualified identifier.
#[track_caller]
pub fn register_plugin(type_name: impl Into<String>, plugin: Box<dyn Any + Send + Sync>) {
    let type_name = type_name.into();
    let location = Location::caller();
    if let Ok(mut reg) = plugin_reg().write() {
        if reg.insert(type_name.clone(), (plugin, location)).is_some() {
            tracing::debug!(broker_type = %type_name, "replaced existing plugin registration");
        }
    }
}

/// Resolve a registered broker factory by identifier (case-sensitive).
///
/// An unknown identifier is a [`BrokerError::NotFound`]; an identifier bound
/// to a plugin that is not a broker factory is a
/// [`BrokerError::ContractMismatch`].
pub fn resolve_broker_factory(type_name: &str) -> Result<Arc<dyn BrokerFactory>> {
    let reg = plugin_reg().read().ok();
    match reg.as_ref().and_then(|r| r.get(type_name)) {
        None => Err(BrokerError::NotFound(type_name.to_string())),
        Some((plugin, _)) => plugin
            .downcast_ref::<Arc<dyn BrokerFactory>>()
            .cloned()
            .ok_or_else(|| BrokerError::ContractMismatch(type_name.to_string())),
    }
}

/// Identifiers of every registered plugin, sorted.
pub fn registered_types() -> Vec<String> {
    let mut types: Vec<String> = plugin_reg()
        .read()
        .ok()
        .map(|r| r.keys().cloned().collect())
        .unwrap_or_default();
    types.sort();
    types
}

/// Registered identifiers with the source location that registered each.
pub fn registry_diagnostics() -> Vec<(String, &'static Location<'static>)> {
    plugin_reg()
        .read()
        .ok()
        .map(|r| r.iter().map(|(k, (_p, loc))| (k.clone(), *loc)).collect())
        .unwrap_or_default()
}
