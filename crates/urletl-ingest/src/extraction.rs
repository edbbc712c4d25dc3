//! Extraction stage: isolate the `urls` record list from the raw payload.

use crate::ingestion::RawPayload;
use serde_json::{Map, Value};
use tracing::warn;

/// Field of the payload holding the record list.
pub const URLS_FIELD: &str = "urls";

/// One record as delivered by the API.
pub type RawRecord = Map<String, Value>;

/// Return the records under `urls`
///
/// A missing or non-array `urls` field means there is nothing to process and
/// yields an empty list. Array elements that are not objects are dropped, so
/// the returned length (reported as `extracted` by the pipeline) can be lower
/// than the length of the `urls` array.
pub fn extract_urls(payload: &RawPayload) -> Vec<RawRecord> {
    let Some(items) = payload.get(URLS_FIELD).and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::Object(record) => Some(record.clone()),
            other => {
                warn!(index, kind = value_kind(other), "Skipping non-object entry in urls");
                None
            },
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
