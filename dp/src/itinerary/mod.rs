//! Itinerary synthesis
//!
//! Renders the itinerary prompt from the user's preferences and the candidate
//! venues, asks the completion service once, and turns its text into a
//! [`DatePlanResponse`]. Every failure comes back as a [`SynthesisError`];
//! nothing here panics or propagates transport errors raw.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

mod parse;

pub use parse::{parse_itinerary_object, parse_plan, strip_code_fence};

use crate::domain::{DatePlanResponse, DatePreferences, Venue};
use crate::llm::{CompletionRequest, LlmClient, LlmError, StopReason};
use crate::prompts::{ItineraryContext, PromptLoader};

/// Sampling temperature for itinerary generation
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Ways itinerary synthesis can fail
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The completion call itself failed (network, API, rate limit)
    #[error("Error generating AI itinerary. Please try again later.")]
    Generation(#[source] LlmError),

    /// The prompt could not be rendered
    #[error("Error generating AI itinerary. Please try again later.")]
    Prompt(String),

    #[error("Invalid JSON response from completion service: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Completion response is not a JSON object")]
    NotAnObject,

    #[error("Invalid `itinerary` format from completion service")]
    MalformedItinerary,
}

/// Builds itineraries with a completion service
pub struct Synthesizer {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader) -> Self {
        Self {
            llm,
            prompts,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Generate a plan from the combined venue list (restaurants first)
    pub async fn synthesize(
        &self,
        venues: &[Venue],
        preferences: &DatePreferences,
    ) -> Result<DatePlanResponse, SynthesisError> {
        debug!(venue_count = venues.len(), "synthesize: called");

        let prompt = ItineraryContext::new(preferences, venues)
            .and_then(|ctx| self.prompts.itinerary_prompt(&ctx))
            .map_err(|e| {
                error!(error = %e, "synthesize: prompt rendering failed");
                SynthesisError::Prompt(e.to_string())
            })?;

        let request = CompletionRequest::user_prompt(prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = self.llm.complete(request).await.map_err(|e| {
            error!(error = %e, "synthesize: completion call failed");
            SynthesisError::Generation(e)
        })?;

        if response.stop_reason != StopReason::EndTurn {
            warn!(stop_reason = ?response.stop_reason, "synthesize: completion did not end normally");
        }

        let raw = response.content.unwrap_or_default();
        let plan = parse_plan(&raw).inspect_err(|e| {
            warn!(error = %e, raw = %raw, "synthesize: unusable completion");
        })?;

        info!(
            steps = plan.itinerary.len(),
            tips = plan.tips.len(),
            "synthesize: itinerary generated"
        );
        Ok(plan)
    }
}
