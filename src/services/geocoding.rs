use crate::models::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when resolving a place to a coordinate
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Place not found: {query}")]
    NotFound { query: String },

    #[error("Geocoding API returned error: {0}")]
    ApiError(String),

    #[error("Geocoding is disabled")]
    Disabled,
}

/// Geocoding provider port
///
/// Single-shot lookup, no retries. Callers that give up on a slow lookup
/// simply drop the future.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name to a coordinate
    async fn resolve(&self, place: &str) -> Result<Coordinate, GeocodeError>;
}

/// Google Maps Geocoding API client
pub struct GoogleGeocoder {
    base_url: String,
    api_key: String,
    region_suffix: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinate,
}

impl GoogleGeocoder {
    /// Create a new geocoding client
    pub fn new(
        base_url: String,
        api_key: String,
        region_suffix: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            region_suffix,
            client,
        })
    }

    /// Address sent to the API, e.g. "Казань, Россия"
    fn address_for(&self, place: &str) -> String {
        match &self.region_suffix {
            Some(suffix) if !suffix.is_empty() => format!("{}, {}", place, suffix),
            _ => place.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Geocoder for GoogleGeocoder {
    async fn resolve(&self, place: &str) -> Result<Coordinate, GeocodeError> {
        let address = self.address_for(place);
        let url = format!(
            "{}/geocode/json?address={}&key={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&address),
            urlencoding::encode(&self.api_key)
        );

        tracing::debug!("Geocoding '{}'", address);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Failed to geocode '{}': {}",
                place,
                response.status()
            )));
        }

        let body: GeocodeResponse = response.json().await?;

        match body.status.as_str() {
            "OK" => body
                .results
                .into_iter()
                .next()
                .map(|result| result.geometry.location)
                .ok_or_else(|| GeocodeError::NotFound {
                    query: place.to_string(),
                }),
            "ZERO_RESULTS" => Err(GeocodeError::NotFound {
                query: place.to_string(),
            }),
            other => {
                tracing::warn!("Geocoding '{}' returned status {}", place, other);
                Err(GeocodeError::ApiError(
                    body.error_message.unwrap_or_else(|| other.to_string()),
                ))
            }
        }
    }
}

/// Geocoder used when no API key is configured
pub struct DisabledGeocoder;

#[async_trait::async_trait]
impl Geocoder for DisabledGeocoder {
    async fn resolve(&self, _place: &str) -> Result<Coordinate, GeocodeError> {
        Err(GeocodeError::Disabled)
    }
}
