//! Payload types exchanged with Service A.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object returned by Service A, passed through to the page untouched.
///
/// By convention it carries an `items` array, but nothing enforces that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponsePayload(Map<String, Value>);

impl ResponsePayload {
    /// Wrap an already parsed JSON object.
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Payload used when Service A could not be reached: `{"items": []}`.
    pub fn fallback() -> Self {
        let mut map = Map::new();
        map.insert("items".to_string(), Value::Array(Vec::new()));
        Self(map)
    }

    /// The `items` array, if present.
    pub fn items(&self) -> Option<&Vec<Value>> {
        self.0.get("items").and_then(Value::as_array)
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Borrow the underlying object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}
