//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::domain::{DatePreferences, Venue};

/// Template name of the itinerary prompt
pub const ITINERARY_TEMPLATE: &str = "itinerary";

/// Context for rendering the itinerary prompt
#[derive(Debug, Clone, Serialize)]
pub struct ItineraryContext {
    pub location: String,
    pub date_type: String,
    /// Comma-joined food preference labels
    pub food_preferences: String,
    /// Comma-joined activity preference labels
    pub activity_preferences: String,
    /// Candidate venues as pretty-printed JSON
    pub places: String,
}

impl ItineraryContext {
    /// Build the context from the user's preferences and the combined venue list
    pub fn new(preferences: &DatePreferences, venues: &[Venue]) -> Result<Self> {
        debug!(venue_count = venues.len(), "ItineraryContext::new: called");
        let places = serde_json::to_string_pretty(venues).map_err(|e| eyre!("Failed to serialize venues: {}", e))?;

        Ok(Self {
            location: preferences.location.clone(),
            date_type: preferences.date_type.clone(),
            food_preferences: preferences.food_preferences.join(", "),
            activity_preferences: preferences.activity_preferences.join(", "),
            places,
        })
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// Configured override directory
    user_dir: Option<PathBuf>,
    /// Working-directory default (`prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader searching `override_dir`, then `prompts/` under `workdir`
    pub fn new(override_dir: Option<&Path>, workdir: impl AsRef<Path>) -> Self {
        let repo_dir = workdir.as_ref().join("prompts");
        debug!(?override_dir, ?repo_dir, "PromptLoader::new: called");

        let user_dir = override_dir.filter(|d| d.exists()).map(Path::to_path_buf);
        if override_dir.is_some() && user_dir.is_none() {
            debug!("PromptLoader::new: override directory missing, ignoring");
        }

        let repo_dir = if repo_dir.exists() {
            debug!("PromptLoader::new: repo directory found");
            Some(repo_dir)
        } else {
            debug!("PromptLoader::new: no repo directory");
            None
        };

        Self {
            hbs: Self::engine(),
            user_dir,
            repo_dir,
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
            repo_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; HTML escaping would mangle quotes in the venue JSON
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `{dir}/{name}.pmt`
    /// 2. Repo default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        for dir in [&self.user_dir, &self.repo_dir].into_iter().flatten() {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found on disk");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Render the itinerary prompt
    pub fn itinerary_prompt(&self, context: &ItineraryContext) -> Result<String> {
        let prompt = self.render(ITINERARY_TEMPLATE, context)?;
        info!(
            location = %context.location,
            prompt_len = prompt.len(),
            "Rendered itinerary prompt"
        );
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinates;

    fn preferences() -> DatePreferences {
        DatePreferences {
            location: "Boston".to_string(),
            date_type: "Romantic".to_string(),
            food_preferences: vec!["Italian".to_string(), "French".to_string()],
            activity_preferences: vec!["Park".to_string()],
        }
    }

    fn venues() -> Vec<Venue> {
        vec![Venue {
            name: "Giacomo's \"North End\"".to_string(),
            address: "355 Hanover St".to_string(),
            location: Some(Coordinates::new(42.36, -71.05)),
            types: vec!["italian_restaurant".to_string()],
            rating: Some(4.6),
            user_rating_count: Some(2100),
        }]
    }

    #[test]
    fn test_itinerary_prompt_restates_preferences() {
        let loader = PromptLoader::embedded_only();
        let ctx = ItineraryContext::new(&preferences(), &venues()).unwrap();

        let prompt = loader.itinerary_prompt(&ctx).unwrap();
        assert!(prompt.contains("**Location:** Boston"));
        assert!(prompt.contains("**Date Type:** Romantic"));
        assert!(prompt.contains("**Food Preferences:** Italian, French"));
        assert!(prompt.contains("**Activity Preferences:** Park"));
        assert!(prompt.contains("Return only a JSON object"));
    }

    #[test]
    fn test_itinerary_prompt_embeds_unescaped_venue_json() {
        let loader = PromptLoader::embedded_only();
        let ctx = ItineraryContext::new(&preferences(), &venues()).unwrap();

        let prompt = loader.itinerary_prompt(&ctx).unwrap();
        assert!(prompt.contains(r#""name": "Giacomo's \"North End\"""#));
        assert!(prompt.contains(r#""user_rating_count": 2100"#));
        assert!(!prompt.contains("&quot;"));
    }

    #[test]
    fn test_override_directory_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("itinerary.pmt"), "Plan {{date_type}} in {{location}}").unwrap();

        let workdir = tempfile::tempdir().unwrap();
        let loader = PromptLoader::new(Some(dir.path()), workdir.path());
        let ctx = ItineraryContext::new(&preferences(), &[]).unwrap();

        assert_eq!(loader.itinerary_prompt(&ctx).unwrap(), "Plan Romantic in Boston");
    }

    #[test]
    fn test_repo_directory_used_before_embedded() {
        let workdir = tempfile::tempdir().unwrap();
        std::fs::create_dir(workdir.path().join("prompts")).unwrap();
        std::fs::write(workdir.path().join("prompts/itinerary.pmt"), "Places: {{places}}").unwrap();

        let loader = PromptLoader::new(None, workdir.path());
        let ctx = ItineraryContext::new(&preferences(), &[]).unwrap();

        assert_eq!(loader.itinerary_prompt(&ctx).unwrap(), "Places: []");
    }

    #[test]
    fn test_missing_override_falls_back_to_embedded() {
        let workdir = tempfile::tempdir().unwrap();
        let loader = PromptLoader::new(Some(Path::new("/nonexistent/prompts")), workdir.path());
        let ctx = ItineraryContext::new(&preferences(), &[]).unwrap();

        assert!(loader.itinerary_prompt(&ctx).unwrap().contains("Available Places:"));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }
}
