//! Completion text -> itinerary object
//!
//! Models wrap JSON in markdown fences despite being told not to, and
//! sometimes omit `tips`. Both are tolerated; a missing or non-list
//! `itinerary` is not.

use serde_json::{Map, Value};
use tracing::debug;

use super::SynthesisError;
use crate::domain::DatePlanResponse;

const FENCE_OPEN: &str = "```json\n";
const FENCE_CLOSE: &str = "```";

/// Trim the raw completion and remove a wrapping ```json fence
///
/// The opening marker and the closing marker are removed independently.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let text = text.strip_prefix(FENCE_OPEN).unwrap_or(text);
    text.strip_suffix(FENCE_CLOSE).unwrap_or(text)
}

/// Validate a completion and coerce it into a plan object
///
/// Returns the object with `tips` guaranteed to be a list.
pub fn parse_itinerary_object(raw: &str) -> Result<Map<String, Value>, SynthesisError> {
    let cleaned = strip_code_fence(raw);
    debug!(raw_len = raw.len(), cleaned_len = cleaned.len(), "parse_itinerary_object: called");

    let value: Value = serde_json::from_str(cleaned).map_err(SynthesisError::InvalidJson)?;

    let Value::Object(mut obj) = value else {
        return Err(SynthesisError::NotAnObject);
    };

    if !matches!(obj.get("itinerary"), Some(Value::Array(_))) {
        return Err(SynthesisError::MalformedItinerary);
    }

    if !matches!(obj.get("tips"), Some(Value::Array(_))) {
        debug!("parse_itinerary_object: tips missing or not a list, defaulting to []");
        obj.insert("tips".to_string(), Value::Array(Vec::new()));
    }

    Ok(obj)
}

/// Parse a completion all the way to the typed plan
pub fn parse_plan(raw: &str) -> Result<DatePlanResponse, SynthesisError> {
    let obj = parse_itinerary_object(raw)?;
    let empty = Vec::new();
    let itinerary = obj.get("itinerary").and_then(Value::as_array).unwrap_or(&empty);
    let tips = obj.get("tips").and_then(Value::as_array).unwrap_or(&empty);
    Ok(DatePlanResponse::from_json(itinerary, tips))
}
