// src/pipeline/normalize.rs

//! Fail-soft payload normalization.

use serde_json::{Map, Value};

use crate::models::NormalizedPayload;

/// Coerce a decoded JSON value into `{ meta, items }`.
///
/// - an array becomes the item list with empty meta;
/// - an object with an array `items` keeps its `meta` (when it is an object);
/// - anything else degrades to an empty collection.
pub fn normalize(raw: Value) -> NormalizedPayload {
    match raw {
        Value::Array(items) => NormalizedPayload {
            meta: Map::new(),
            items,
        },
        Value::Object(mut envelope) => match envelope.remove("items") {
            Some(Value::Array(items)) => {
                let meta = match envelope.remove("meta") {
                    Some(Value::Object(meta)) => meta,
                    _ => Map::new(),
                };
                NormalizedPayload { meta, items }
            }
            _ => NormalizedPayload::default(),
        },
        _ => NormalizedPayload::default(),
    }
}
