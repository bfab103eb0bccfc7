//! Itinerary returned to the client

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One ordered stop in a date plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryStep {
    /// 1-based position in the itinerary
    pub step: u32,
    pub title: String,
    /// Venue name
    #[serde(rename = "location")]
    pub venue: String,
    pub address: String,
    #[serde(rename = "type", default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_rating_count: Option<u64>,
    pub description: String,
}

impl ItineraryStep {
    /// Build a step from one entry of a model-produced `itinerary` array
    ///
    /// Missing fields fall back to empty values; a missing or non-positive
    /// step index takes `position` (1-based). Returns None for non-objects.
    pub fn from_json(position: u32, value: &Value) -> Option<Self> {
        debug!(%position, "ItineraryStep::from_json: called");
        let obj = value.as_object()?;

        let text = |key: &str| -> String {
            match obj.get(key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            }
        };

        let step = obj
            .get("step")
            .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(position);

        let categories = match obj.get("type") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        };

        let rating = obj.get("rating").and_then(Value::as_f64);
        let user_rating_count = obj
            .get("user_rating_count")
            .and_then(|v| v.as_u64().or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)));

        Some(Self {
            step,
            title: text("title"),
            venue: text("location"),
            address: text("address"),
            categories,
            rating,
            user_rating_count,
            description: text("description"),
        })
    }
}

/// A complete date plan: ordered steps plus free-text tips
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatePlanResponse {
    pub itinerary: Vec<ItineraryStep>,
    pub tips: Vec<String>,
}

impl DatePlanResponse {
    /// Convert already shape-checked `itinerary` and `tips` arrays
    pub fn from_json(itinerary: &[Value], tips: &[Value]) -> Self {
        debug!(steps = itinerary.len(), tips = tips.len(), "DatePlanResponse::from_json: called");
        let itinerary = itinerary
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| ItineraryStep::from_json(idx as u32 + 1, entry))
            .collect();

        let tips = tips
            .iter()
            .filter_map(|tip| match tip {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect();

        Self { itinerary, tips }
    }
}
