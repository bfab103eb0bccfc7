//! Location resolution
//!
//! A [`Geocoder`] turns free text (a city or postal code) into coordinates.
//! Failure is an ordinary outcome, not an error: callers only learn that the
//! location could not be resolved. Details are logged by the implementation.

use async_trait::async_trait;

mod google;

pub use google::GoogleGeocoder;

use crate::domain::Coordinates;

/// Resolves a location string to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a location, or None when it cannot be found
    async fn geocode(&self, location: &str) -> Option<Coordinates>;
}
