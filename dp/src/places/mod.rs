//! Nearby venue search
//!
//! A [`PlaceFinder`] turns a category label plus coordinates into a list of
//! venues. Failures never propagate: a finder that cannot reach its service
//! returns an empty list.

use async_trait::async_trait;

mod categories;
mod google;

pub use categories::{BUILTIN_CATEGORIES, CategoryTable, FALLBACK_CATEGORY};
pub use google::{FIELD_MASK, GooglePlaces};

use crate::config::SearchConfig;
use crate::domain::{Coordinates, Venue};

/// Default search radius in meters
pub const DEFAULT_RADIUS_M: u32 = 5000;

/// Default maximum venues per search
pub const DEFAULT_MAX_RESULTS: u32 = 20;

/// Bounds for one nearby search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub radius_m: u32,
    pub max_results: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            radius_m: config.radius_m,
            max_results: config.max_results,
        }
    }
}

/// Finds venues of one category around a point
#[async_trait]
pub trait PlaceFinder: Send + Sync {
    /// Search for venues matching a human-facing category label
    ///
    /// Results keep the provider's ordering (most popular first). An empty
    /// list means either nothing matched or the search failed.
    async fn find_places(&self, center: Coordinates, category: &str, options: SearchOptions) -> Vec<Venue>;
}
