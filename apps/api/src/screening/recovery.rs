//! JSON recovery for model output that may carry prose or markdown fencing around
//! the object we asked for.

use serde_json::Value;
use tracing::warn;

use crate::errors::ScreenError;
use crate::screening::schema::{RecordSchema, StructuredRecord};

/// Returns the slice from the first `{` to the last `}` (inclusive).
pub fn locate_json_object(raw: &str) -> Result<&str, ScreenError> {
    let no_object = || ScreenError::Extraction("no JSON object found".to_string());

    let start = raw.find('{').ok_or_else(no_object)?;
    let end = raw.rfind('}').filter(|end| *end > start).ok_or_else(no_object)?;

    Ok(&raw[start..=end])
}

/// Locates and parses the JSON object in a model response.
pub fn parse_json_object(raw: &str) -> Result<Value, ScreenError> {
    let candidate = locate_json_object(raw)?;
    serde_json::from_str(candidate).map_err(|e| ScreenError::Extraction(e.to_string()))
}

/// Turns raw model output into a record of `schema`. Never fails: anything
/// unrecoverable yields the placeholder record.
pub fn recover_record(schema: &RecordSchema, raw: &str) -> StructuredRecord {
    match parse_json_object(raw) {
        Ok(Value::Object(map)) => StructuredRecord::from_object(schema, map),
        Ok(other) => {
            warn!(
                schema = schema.label,
                "model returned non-object JSON, using defaults: {other}"
            );
            StructuredRecord::placeholder(schema)
        }
        Err(e) => {
            warn!(
                schema = schema.label,
                "could not recover JSON ({e}), using defaults; raw response: {raw}"
            );
            StructuredRecord::placeholder(schema)
        }
    }
}
