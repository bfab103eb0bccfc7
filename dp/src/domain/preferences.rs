//! User date-planning preferences

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Why a set of preferences cannot be planned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    #[error("location must not be empty")]
    EmptyLocation,

    #[error("at least one food preference is required")]
    NoFoodPreference,

    #[error("at least one activity preference is required")]
    NoActivityPreference,
}

/// Input to a plan request
///
/// Only the first food and first activity preference drive the venue search;
/// the full lists are still restated to the completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatePreferences {
    /// City name or postal code
    pub location: String,
    /// Casual, Romantic, First Date, Anniversary, ...
    pub date_type: String,
    pub food_preferences: Vec<String>,
    pub activity_preferences: Vec<String>,
}

impl DatePreferences {
    /// Check the preferences can be planned at all
    pub fn validate(&self) -> Result<(), PreferenceError> {
        debug!(location = %self.location, "DatePreferences::validate: called");
        if self.location.trim().is_empty() {
            return Err(PreferenceError::EmptyLocation);
        }
        if self.food_preferences.is_empty() {
            return Err(PreferenceError::NoFoodPreference);
        }
        if self.activity_preferences.is_empty() {
            return Err(PreferenceError::NoActivityPreference);
        }
        Ok(())
    }

    /// Category label used for the restaurant search
    pub fn primary_food(&self) -> Option<&str> {
        self.food_preferences.first().map(String::as_str)
    }

    /// Category label used for the activity search
    pub fn primary_activity(&self) -> Option<&str> {
        self.activity_preferences.first().map(String::as_str)
    }
}
