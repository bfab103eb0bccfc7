//! Date planner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main date planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Inbound HTTP server
    pub server: ServerConfig,

    /// Geocoding and places-search credentials and endpoints
    pub google: GoogleConfig,

    /// Nearby search defaults
    pub search: SearchConfig,

    /// Completion service configuration
    pub llm: LlmConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,

    /// Extra category label -> provider identifier entries
    pub categories: BTreeMap<String, String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the credential environment variables are set.
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        self.google.api_key()?;
        self.llm.api_key()?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: ./dateplanner.yml
        let local_config = PathBuf::from("dateplanner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/dateplanner/dateplanner.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("dateplanner").join("dateplanner.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed here; the full `load` reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from("dateplanner.yml")];
                if let Some(config_dir) = dirs::config_dir() {
                    paths.push(config_dir.join("dateplanner").join("dateplanner.yml"));
                }
                paths
            }
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Read a credential from the named environment variable
fn read_key(env_name: &str, what: &str) -> Result<String> {
    match std::env::var(env_name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(eyre::eyre!("{} API key not found. Set the {} environment variable.", what, env_name)),
    }
}

/// Inbound HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind: String,

    /// Port to listen on
    pub port: u16,

    /// Prebuilt frontend served for paths outside `/api`
    #[serde(rename = "static-dir")]
    pub static_dir: Option<PathBuf>,

    /// Allowed CORS origins ("*" allows any)
    #[serde(rename = "cors-origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
            static_dir: None,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Geocoding and places-search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Geocoding endpoint
    #[serde(rename = "geocode-url")]
    pub geocode_url: String,

    /// Nearby places-search endpoint
    #[serde(rename = "places-url")]
    pub places_url: String,

    /// Language for place results
    #[serde(rename = "language-code")]
    pub language_code: String,

    /// Region bias for place results
    #[serde(rename = "region-code")]
    pub region_code: String,

    /// Request timeout in milliseconds (transport default when unset)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: Option<u64>,
}

impl GoogleConfig {
    pub fn api_key(&self) -> Result<String> {
        read_key(&self.api_key_env, "Google Places")
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GOOGLE_PLACES_API_KEY".to_string(),
            geocode_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            places_url: "https://places.googleapis.com/v1/places:searchNearby".to_string(),
            language_code: "en".to_string(),
            region_code: "US".to_string(),
            timeout_ms: None,
        }
    }
}

/// Nearby search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search radius in meters
    #[serde(rename = "radius-m")]
    pub radius_m: u32,

    /// Maximum venues per category
    #[serde(rename = "max-results")]
    pub max_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_m: 5000,
            max_results: 20,
        }
    }
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens per response (omitted from the request when unset)
    #[serde(rename = "max-tokens")]
    pub max_tokens: Option<u32>,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    pub fn api_key(&self) -> Result<String> {
        read_key(&self.api_key_env, "LLM")
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            temperature: 0.7,
            max_tokens: None,
            timeout_ms: 300_000,
        }
    }
}

/// Prompt template configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory searched for `{name}.pmt` before the defaults
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.search.radius_m, 5000);
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.server.port, 8000);
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();

        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.base_url, "https://api.openai.com");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.max_tokens.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

server:
  bind: 0.0.0.0
  port: 9000
  static-dir: frontend/build
  cors-origins:
    - https://dates.example.com

google:
  api-key-env: MY_MAPS_KEY
  region-code: CA
  timeout-ms: 10000

search:
  radius-m: 2500
  max-results: 5

llm:
  model: gpt-4o-mini
  temperature: 0.2
  max-tokens: 2048

categories:
  Ramen: ramen_restaurant
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.static_dir, Some(PathBuf::from("frontend/build")));
        assert_eq!(config.server.cors_origins, vec!["https://dates.example.com"]);
        assert_eq!(config.google.api_key_env, "MY_MAPS_KEY");
        assert_eq!(config.google.region_code, "CA");
        assert_eq!(config.google.language_code, "en");
        assert_eq!(config.google.timeout_ms, Some(10_000));
        assert_eq!(config.search.radius_m, 2500);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, Some(2048));
        assert_eq!(config.categories.get("Ramen").map(String::as_str), Some("ramen_restaurant"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gpt-4.1
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.llm.model, "gpt-4.1");

        // Defaults for unspecified
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.google.api_key_env, "GOOGLE_PLACES_API_KEY");
        assert_eq!(config.search.radius_m, 5000);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yml");
        fs::write(&path, "log-level: warn\nsearch:\n  max-results: 3\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.search.max_results, 3);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let path = PathBuf::from("/nonexistent/dateplanner.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    #[serial]
    fn test_validate_reports_missing_key() {
        let mut config = Config::default();
        config.google.api_key_env = "DP_TEST_MISSING_GOOGLE_KEY".to_string();
        config.llm.api_key_env = "DP_TEST_MISSING_LLM_KEY".to_string();
        unsafe {
            std::env::remove_var("DP_TEST_MISSING_GOOGLE_KEY");
        }

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("DP_TEST_MISSING_GOOGLE_KEY"));
    }

    #[test]
    #[serial]
    fn test_validate_passes_with_keys() {
        let mut config = Config::default();
        config.google.api_key_env = "DP_TEST_GOOGLE_KEY".to_string();
        config.llm.api_key_env = "DP_TEST_LLM_KEY".to_string();
        unsafe {
            std::env::set_var("DP_TEST_GOOGLE_KEY", "g-key");
            std::env::set_var("DP_TEST_LLM_KEY", "l-key");
        }

        assert!(config.validate().is_ok());
        assert_eq!(config.google.api_key().unwrap(), "g-key");
        assert_eq!(config.llm.api_key().unwrap(), "l-key");

        unsafe {
            std::env::remove_var("DP_TEST_GOOGLE_KEY");
            std::env::remove_var("DP_TEST_LLM_KEY");
        }
    }
}
