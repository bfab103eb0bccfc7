//! Request orchestration
//!
//! One plan request runs: validate -> geocode -> two place searches
//! (concurrently) -> synthesize. The first hard failure ends the request.

use std::sync::Arc;

use eyre::{Context, Result};
use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{DatePlanResponse, DatePreferences, PreferenceError};
use crate::geocode::{Geocoder, GoogleGeocoder};
use crate::itinerary::{SynthesisError, Synthesizer};
use crate::llm::create_client;
use crate::places::{CategoryTable, GooglePlaces, PlaceFinder, SearchOptions};
use crate::prompts::PromptLoader;

/// Message returned to clients when the location cannot be geocoded
pub const LOCATION_ERROR: &str = "Error: Unable to fetch location coordinates. Please check the location input.";

/// Why a plan could not be produced
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid preferences: {0}")]
    InvalidPreferences(#[from] PreferenceError),

    #[error("{}", LOCATION_ERROR)]
    LocationNotResolved,

    #[error("Invalid AI response format: {0}")]
    Synthesis(#[from] SynthesisError),
}

/// Sequences geocoding, venue search and itinerary synthesis
pub struct DatePlanner {
    geocoder: Arc<dyn Geocoder>,
    places: Arc<dyn PlaceFinder>,
    synthesizer: Synthesizer,
    search: SearchOptions,
}

impl DatePlanner {
    pub fn new(geocoder: Arc<dyn Geocoder>, places: Arc<dyn PlaceFinder>, synthesizer: Synthesizer) -> Self {
        Self {
            geocoder,
            places,
            synthesizer,
            search: SearchOptions::default(),
        }
    }

    pub fn with_search_options(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    /// Build the production planner: Google geocoding and places, configured LLM
    pub fn from_config(config: &Config) -> Result<Self> {
        debug!("DatePlanner::from_config: called");
        let geocoder = GoogleGeocoder::from_config(&config.google)?;
        let places = GooglePlaces::from_config(&config.google, CategoryTable::with_overrides(&config.categories))?;
        let llm = create_client(&config.llm).context("Failed to create LLM client")?;

        let workdir = std::env::current_dir().context("Failed to read working directory")?;
        let prompts = PromptLoader::new(config.prompts.dir.as_deref(), workdir);
        let synthesizer = Synthesizer::new(llm, prompts)
            .with_temperature(config.llm.temperature)
            .with_max_tokens(config.llm.max_tokens);

        Ok(Self::new(Arc::new(geocoder), Arc::new(places), synthesizer).with_search_options((&config.search).into()))
    }

    /// Produce a date plan for the given preferences
    pub async fn generate(&self, preferences: &DatePreferences) -> Result<DatePlanResponse, PlanError> {
        let request_id = Uuid::now_v7();
        let span = info_span!("plan", %request_id, location = %preferences.location);
        self.generate_inner(preferences).instrument(span).await
    }

    async fn generate_inner(&self, preferences: &DatePreferences) -> Result<DatePlanResponse, PlanError> {
        debug!(?preferences, "generate: called");
        preferences.validate()?;

        let Some(food) = preferences.primary_food() else {
            return Err(PreferenceError::NoFoodPreference.into());
        };
        let Some(activity) = preferences.primary_activity() else {
            return Err(PreferenceError::NoActivityPreference.into());
        };

        let Some(center) = self.geocoder.geocode(&preferences.location).await else {
            warn!("generate: location not resolved");
            return Err(PlanError::LocationNotResolved);
        };
        info!(%center, "generate: location resolved");

        let (restaurants, activities) = tokio::join!(
            self.places.find_places(center, food, self.search),
            self.places.find_places(center, activity, self.search),
        );
        info!(
            restaurants = restaurants.len(),
            activities = activities.len(),
            "generate: venues found"
        );

        let mut venues = restaurants;
        venues.extend(activities);

        let plan = self.synthesizer.synthesize(&venues, preferences).await?;
        info!(steps = plan.itinerary.len(), "generate: plan ready");
        Ok(plan)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::domain::{Coordinates, Venue};
    use crate::geocode::Geocoder;
    use crate::places::{PlaceFinder, SearchOptions};

    /// Geocoder returning a fixed answer
    pub struct FakeGeocoder {
        pub answer: Option<Coordinates>,
        pub calls: AtomicUsize,
    }

    impl FakeGeocoder {
        pub fn resolving(lat: f64, lng: f64) -> Self {
            Self {
                answer: Some(Coordinates::new(lat, lng)),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn unresolvable() -> Self {
            Self {
                answer: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn geocode(&self, _location: &str) -> Option<Coordinates> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    /// Place finder keyed by category label; records every search
    #[derive(Default)]
    pub struct FakePlaces {
        pub by_label: HashMap<String, Vec<Venue>>,
        pub searches: Mutex<Vec<(Coordinates, String, SearchOptions)>>,
    }

    impl FakePlaces {
        pub fn with(mut self, label: &str, names: &[&str]) -> Self {
            let venues = names
                .iter()
                .map(|name| Venue {
                    name: name.to_string(),
                    address: format!("{} address", name),
                    location: None,
                    types: vec![label.to_lowercase()],
                    rating: Some(4.5),
                    user_rating_count: Some(100),
                })
                .collect();
            self.by_label.insert(label.to_string(), venues);
            self
        }

        pub fn searched_labels(&self) -> Vec<String> {
            let mut labels: Vec<String> = self
                .searches
                .lock()
                .map(|s| s.iter().map(|(_, label, _)| label.clone()).collect())
                .unwrap_or_default();
            labels.sort();
            labels
        }
    }

    #[async_trait]
    impl PlaceFinder for FakePlaces {
        async fn find_places(&self, center: Coordinates, category: &str, options: SearchOptions) -> Vec<Venue> {
            if let Ok(mut searches) = self.searches.lock() {
                searches.push((center, category.to_string(), options));
            }
            self.by_label.get(category).cloned().unwrap_or_default()
        }
    }
}
