//! Google Geocoding API client

use std::time::Duration;

use async_trait::async_trait;
use eyre::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::Geocoder;
use crate::config::GoogleConfig;
use crate::domain::Coordinates;

/// Single-attempt geocoding client
pub struct GoogleGeocoder {
    http: Client,
    url: String,
    api_key: String,
}

impl GoogleGeocoder {
    /// Create a client against an explicit endpoint
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from configuration, reading the API key from the environment
    pub fn from_config(config: &GoogleConfig) -> Result<Self> {
        debug!(url = %config.geocode_url, "GoogleGeocoder::from_config: called");
        let api_key = config.api_key()?;

        let mut builder = Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder.build().context("Failed to build geocoding HTTP client")?;

        Ok(Self {
            http,
            url: config.geocode_url.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, location: &str) -> Option<Coordinates> {
        debug!(%location, "geocode: called");

        let response = match self
            .http
            .get(&self.url)
            .query(&[("address", location), ("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(%location, error = %e, "geocode: request failed");
                return None;
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                warn!(%location, error = %e, "geocode: failed to read response body");
                return None;
            }
        };

        if !status.is_success() {
            warn!(%location, status = status.as_u16(), body = %text, "geocode: error status");
            return None;
        }

        let parsed: GeocodeResponse = match serde_json::from_str(&text) {
            Ok(p) => p,
            Err(e) => {
                warn!(%location, error = %e, "geocode: malformed response");
                return None;
            }
        };

        match parsed.results.into_iter().next() {
            Some(result) => {
                let coords = Coordinates::new(result.geometry.location.lat, result.geometry.location.lng);
                debug!(%location, %coords, "geocode: resolved");
                Some(coords)
            }
            None => {
                warn!(%location, status = ?parsed.status, "geocode: no results");
                None
            }
        }
    }
}

// Geocoding API response types

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}
