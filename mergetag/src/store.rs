//! Named application state shared between handlers.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{Error, Map};

/// Key-value state that handlers publish for the host's widgets to read.
///
/// Setting a key overwrites whatever was stored under it before.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Store(Map<String, JsonValue>);

impl Store {
    /// Convenience method for constructing a pre-populated store.
    pub fn with<K, V>(mut self, key: K, value: V) -> Result<Self, Error>
    where
        K: AsRef<str>,
        V: Serialize,
    {
        let _ = self.set(key, value)?;
        Ok(self)
    }

    /// Returns whether or not the store contains a value associated with the
    /// given key.
    pub fn contains_key<K: AsRef<str>>(&self, key: K) -> bool {
        self.0.contains_key(key.as_ref())
    }

    /// Set the value associated with the given key, returning the previous
    /// value if there was one.
    pub fn set<K, V>(&mut self, key: K, value: V) -> Result<Option<JsonValue>, Error>
    where
        K: AsRef<str>,
        V: Serialize,
    {
        let value = serde_json::to_value(value)?;
        Ok(self.0.insert(key.as_ref().to_string(), value))
    }

    pub fn get<K: AsRef<str>>(&self, key: K) -> Option<&JsonValue> {
        self.0.get(key.as_ref())
    }
}
