//! The structured event record that brokers publish.

use serde_json::{Map, Value};

/// A single event: an ordered mapping of field name to JSON-compatible value.
///
/// Field order is preserved end to end (`serde_json` is built with
/// `preserve_order`), so an event serializes with its fields in the order the
/// producer inserted them.
pub type Event = Map<String, Value>;

/// Build an [`Event`] from key-value pairs, keeping insertion order.
pub fn event_from_pairs<K, V, I>(pairs: I) -> Event
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
