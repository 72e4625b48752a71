use crate::domain::error::LivmapError;
use crate::domain::model::{AddressComponent, GeoMatch, LatLng};
use crate::domain::traits::Geocoder;
use crate::infrastructure::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

// Google Geocoding API response structures
#[derive(Deserialize, Debug)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawResult>,
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResult {
    geometry: RawGeometry,
    #[serde(default)]
    address_components: Vec<RawComponent>,
}

#[derive(Deserialize, Debug)]
struct RawGeometry {
    location: RawLocation,
}

#[derive(Deserialize, Debug)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize, Debug)]
struct RawComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

/// Google Geocoding API client
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl GoogleGeocoder {
    /// Build a geocoder from the loaded configuration.
    ///
    /// Fails early when no API key is configured so a batch never starts
    /// without credentials.
    pub fn from_config(client: Client, config: &Config) -> Result<Self, LivmapError> {
        let api_key = config
            .google
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LivmapError::Config("Google API key not configured".to_string()))?
            .to_string();

        Ok(Self {
            client,
            api_key,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<GeoMatch>, LivmapError> {
        let params = [("address", address), ("key", self.api_key.as_str())];

        let response = self
            .client
            .get(GEOCODE_URL)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?
            .json::<GeocodeResponse>()
            .await?;

        match response.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(response.results.into_iter().map(into_match).collect()),
            status => {
                let detail = response
                    .error_message
                    .unwrap_or_else(|| status_message(status).to_string());
                Err(LivmapError::Api(format!(
                    "Geocoding API status {status}: {detail}"
                )))
            }
        }
    }
}

fn into_match(raw: RawResult) -> GeoMatch {
    GeoMatch {
        location: LatLng {
            lat: raw.geometry.location.lat,
            lng: raw.geometry.location.lng,
        },
        address_components: raw
            .address_components
            .into_iter()
            .map(|c| AddressComponent {
                long_name: c.long_name,
                types: c.types,
            })
            .collect(),
    }
}

fn status_message(status: &str) -> &'static str {
    match status {
        "OVER_DAILY_LIMIT" => "API key invalid, billing missing, or daily cap exceeded",
        "OVER_QUERY_LIMIT" => "Query quota exceeded",
        "REQUEST_DENIED" => "Request denied (check API key)",
        "INVALID_REQUEST" => "Missing or invalid address parameter",
        "UNKNOWN_ERROR" => "Server-side error, may succeed on retry",
        _ => "Unknown error",
    }
}
