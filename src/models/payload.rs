//! Canonical `{ meta, items }` envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fetched payload coerced into a uniform shape.
///
/// `items` is always a sequence and `meta` always a mapping, whatever the
/// publishing process produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPayload {
    pub meta: Map<String, Value>,
    pub items: Vec<Value>,
}

impl NormalizedPayload {
    /// `meta.generated_at` as display text, when present.
    pub fn generated_at(&self) -> Option<String> {
        match self.meta.get("generated_at")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::String(_) | Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
