//! Domain types for the date planner
//!
//! Request-scoped values only: the user's preferences, the venues found for
//! them, and the itinerary returned to the client. Nothing here outlives a
//! single request.

mod plan;
mod preferences;
mod venue;

pub use plan::{DatePlanResponse, ItineraryStep};
pub use preferences::{DatePreferences, PreferenceError};
pub use venue::{Coordinates, Venue};
