//! Google Places (New) nearby search

use std::time::Duration;

use async_trait::async_trait;
use eyre::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CategoryTable, PlaceFinder, SearchOptions};
use crate::config::GoogleConfig;
use crate::domain::{Coordinates, Venue};

/// Only the fields the planner consumes
pub const FIELD_MASK: &str = "places.displayName,places.formattedAddress,places.location,\
                              places.types,places.rating,places.userRatingCount";

/// `places:searchNearby` client
pub struct GooglePlaces {
    http: Client,
    url: String,
    api_key: String,
    language_code: String,
    region_code: String,
    categories: CategoryTable,
}

impl GooglePlaces {
    /// Create a client against an explicit endpoint (language "en", region "US")
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, categories: CategoryTable) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            api_key: api_key.into(),
            language_code: "en".to_string(),
            region_code: "US".to_string(),
            categories,
        }
    }

    /// Create a client from configuration, reading the API key from the environment
    pub fn from_config(config: &GoogleConfig, categories: CategoryTable) -> Result<Self> {
        debug!(url = %config.places_url, "GooglePlaces::from_config: called");
        let api_key = config.api_key()?;

        let mut builder = Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder.build().context("Failed to build places HTTP client")?;

        Ok(Self {
            http,
            url: config.places_url.clone(),
            api_key,
            language_code: config.language_code.clone(),
            region_code: config.region_code.clone(),
            categories,
        })
    }

    /// Build the search payload for one provider type
    fn build_request_body(&self, center: Coordinates, included_type: &str, options: SearchOptions) -> serde_json::Value {
        serde_json::json!({
            "languageCode": self.language_code,
            "regionCode": self.region_code,
            "includedTypes": [included_type],
            "maxResultCount": options.max_results,
            "locationRestriction": {
                "circle": {
                    "center": {
                        "latitude": center.latitude,
                        "longitude": center.longitude,
                    },
                    "radius": options.radius_m,
                }
            },
            "rankPreference": "POPULARITY",
        })
    }
}

#[async_trait]
impl PlaceFinder for GooglePlaces {
    async fn find_places(&self, center: Coordinates, category: &str, options: SearchOptions) -> Vec<Venue> {
        let included_type = self.categories.resolve(category);
        debug!(%category, %included_type, %center, ?options, "find_places: called");
        let body = self.build_request_body(center, included_type, options);

        let response = match self
            .http
            .post(&self.url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(%category, error = %e, "find_places: request failed, returning no venues");
                return Vec::new();
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%category, status = status.as_u16(), body = %text, "find_places: search failed, returning no venues");
            return Vec::new();
        }

        match response.json::<NearbyResponse>().await {
            Ok(parsed) => {
                let venues: Vec<Venue> = parsed
                    .places
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, raw)| match serde_json::from_value::<ApiPlace>(raw) {
                        Ok(place) => Some(Venue::from(place)),
                        Err(e) => {
                            warn!(%category, index, error = %e, "find_places: skipping undecodable place");
                            None
                        }
                    })
                    .collect();
                debug!(%category, count = venues.len(), "find_places: success");
                venues
            }
            Err(e) => {
                warn!(%category, error = %e, "find_places: undecodable response, returning no venues");
                Vec::new()
            }
        }
    }
}

// Places API response types

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    /// Decoded one by one so a single odd record does not drop the rest
    #[serde(default)]
    places: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPlace {
    display_name: Option<LocalizedText>,
    formatted_address: Option<String>,
    location: Option<LatLng>,
    #[serde(default)]
    types: Vec<String>,
    rating: Option<f64>,
    user_rating_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: String,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl From<ApiPlace> for Venue {
    fn from(place: ApiPlace) -> Self {
        Self {
            name: place.display_name.map(|d| d.text).unwrap_or_default(),
            address: place.formatted_address.unwrap_or_default(),
            location: place.location.map(|l| Coordinates::new(l.latitude, l.longitude)),
            types: place.types,
            rating: place.rating,
            user_rating_count: place.user_rating_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::BUILTIN_CATEGORIES;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEARCH_PATH: &str = "/v1/places:searchNearby";

    fn boston() -> Coordinates {
        Coordinates::new(42.36, -71.06)
    }

    fn client(server: &MockServer) -> GooglePlaces {
        GooglePlaces::new(format!("{}{}", server.uri(), SEARCH_PATH), "test-key", CategoryTable::builtin())
    }

    fn sample_places() -> serde_json::Value {
        json!({
            "places": [
                {
                    "displayName": {"text": "Giacomo's", "languageCode": "en"},
                    "formattedAddress": "355 Hanover St, Boston, MA 02113, USA",
                    "location": {"latitude": 42.3648, "longitude": -71.0536},
                    "types": ["italian_restaurant", "restaurant", "food"],
                    "rating": 4.6,
                    "userRatingCount": 2100
                },
                {
                    "displayName": {"text": "Carmelina's"},
                    "formattedAddress": "307 Hanover St, Boston, MA 02113, USA",
                    "types": ["italian_restaurant"]
                }
            ]
        })
    }

    #[test]
    fn test_build_request_body() {
        let places = GooglePlaces::new("http://unused", "k", CategoryTable::builtin());
        let body = places.build_request_body(boston(), "park", SearchOptions::default());

        assert_eq!(body["languageCode"], "en");
        assert_eq!(body["regionCode"], "US");
        assert_eq!(body["includedTypes"], json!(["park"]));
        assert_eq!(body["maxResultCount"], 20);
        assert_eq!(body["locationRestriction"]["circle"]["radius"], 5000);
        assert_eq!(body["locationRestriction"]["circle"]["center"]["latitude"], 42.36);
        assert_eq!(body["rankPreference"], "POPULARITY");
    }

    #[tokio::test]
    async fn test_find_places_sends_mapped_category() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .and(header("X-Goog-Api-Key", "test-key"))
            .and(|req: &wiremock::Request| {
                req.headers.get("X-Goog-FieldMask").and_then(|v| v.to_str().ok()) == Some(FIELD_MASK)
            })
            .and(body_partial_json(json!({"includedTypes": ["italian_restaurant"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_places()))
            .expect(1)
            .mount(&server)
            .await;

        let venues = client(&server)
            .find_places(boston(), "Italian", SearchOptions::default())
            .await;

        assert_eq!(venues.len(), 2);
        assert_eq!(venues[0].name, "Giacomo's");
        assert_eq!(venues[0].location, Some(Coordinates::new(42.3648, -71.0536)));
        assert_eq!(venues[0].user_rating_count, Some(2100));
        assert_eq!(venues[1].name, "Carmelina's");
        assert_eq!(venues[1].rating, None);
        assert_eq!(venues[1].location, None);
    }

    #[tokio::test]
    async fn test_find_places_skips_undecodable_records() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "places": [
                    {"displayName": {"text": "Good Place"}},
                    {"displayName": {"languageCode": "en"}},
                    {"displayName": {"text": "Half Located"}, "location": {"latitude": 42.0}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let venues = client(&server)
            .find_places(boston(), "Italian", SearchOptions::default())
            .await;

        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].name, "Good Place");
    }

    #[tokio::test]
    async fn test_find_places_sends_mapped_identifier_for_every_builtin_label() {
        let server = MockServer::start().await;
        for (_, place_type) in BUILTIN_CATEGORIES {
            Mock::given(method("POST"))
                .and(path(SEARCH_PATH))
                .and(body_partial_json(json!({"includedTypes": [place_type]})))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "places": [{"displayName": {"text": place_type}}]
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let places = client(&server);
        for (label, place_type) in BUILTIN_CATEGORIES {
            let venues = places.find_places(boston(), label, SearchOptions::default()).await;
            assert_eq!(venues.len(), 1, "no venue for {label}");
            assert_eq!(venues[0].name, *place_type);
        }

        let requests = server.received_requests().await.unwrap();
        let sent: Vec<String> = requests
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
                body["includedTypes"][0].as_str().unwrap().to_string()
            })
            .collect();
        let expected: Vec<String> = BUILTIN_CATEGORIES.iter().map(|(_, t)| t.to_string()).collect();
        assert_eq!(sent, expected);
    }

    #[tokio::test]
    async fn test_find_places_unknown_label_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .and(body_partial_json(json!({"includedTypes": ["restaurant"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let venues = client(&server)
            .find_places(boston(), "Ethiopian", SearchOptions::default())
            .await;

        assert!(venues.is_empty());
    }

    #[tokio::test]
    async fn test_find_places_custom_bounds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .and(body_partial_json(json!({
                "maxResultCount": 5,
                "locationRestriction": {"circle": {"radius": 1200}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_places()))
            .expect(1)
            .mount(&server)
            .await;

        let options = SearchOptions {
            radius_m: 1200,
            max_results: 5,
        };
        let venues = client(&server).find_places(boston(), "Park", options).await;
        assert_eq!(venues.len(), 2);
    }

    #[tokio::test]
    async fn test_find_places_error_status_returns_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let venues = client(&server)
            .find_places(boston(), "Park", SearchOptions::default())
            .await;
        assert!(venues.is_empty());
    }

    #[tokio::test]
    async fn test_find_places_malformed_body_returns_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let venues = client(&server)
            .find_places(boston(), "Park", SearchOptions::default())
            .await;
        assert!(venues.is_empty());
    }

    #[tokio::test]
    async fn test_find_places_unreachable_returns_empty() {
        let places = GooglePlaces::new("http://127.0.0.1:9/v1/places:searchNearby", "k", CategoryTable::builtin());
        let venues = places.find_places(boston(), "Park", SearchOptions::default()).await;
        assert!(venues.is_empty());
    }
}
