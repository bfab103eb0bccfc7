//! Date Planner - itinerary generation service
//!
//! Takes a location and a couple's food and activity preferences, resolves the
//! location to coordinates, searches for nearby venues in the two chosen
//! categories, and asks a completion service to arrange them into a short
//! step-by-step date itinerary with tips.
//!
//! # Modules
//!
//! - [`domain`] - Preferences, venues and the plan returned to clients
//! - [`geocode`] - Location text to coordinates
//! - [`places`] - Category table and nearby venue search
//! - [`llm`] - Completion client trait and OpenAI implementation
//! - [`prompts`] - Itinerary prompt templates
//! - [`itinerary`] - Prompting and response normalization
//! - [`planner`] - Request orchestration
//! - [`server`] - HTTP surface
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod geocode;
pub mod itinerary;
pub mod llm;
pub mod places;
pub mod planner;
pub mod prompts;
pub mod server;

pub use config::{Config, LlmConfig};
pub use domain::{Coordinates, DatePlanResponse, DatePreferences, ItineraryStep, PreferenceError, Venue};
pub use geocode::{Geocoder, GoogleGeocoder};
pub use itinerary::{SynthesisError, Synthesizer};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient};
pub use places::{CategoryTable, GooglePlaces, PlaceFinder, SearchOptions};
pub use planner::{DatePlanner, LOCATION_ERROR, PlanError};
pub use prompts::PromptLoader;
