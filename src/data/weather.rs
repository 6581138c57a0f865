//! Weather provider API client
//!
//! Fetches current conditions as raw bytes (one GET, no retries) and parses
//! cached or freshly fetched bytes into an [`Observation`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use super::{Observation, Units};
use crate::config::Config;

/// Base URL for the provider API
const WUNDERGROUND_BASE_URL: &str = "http://api.wunderground.com";

/// Default bound on a single request, connect through body
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching or parsing weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Transport failure (DNS, connection refused, reset)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request did not complete within the fetch timeout
    #[error("Weather request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The provider answered with something other than 200 OK
    #[error("Weather service returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// The base URL cannot carry the conditions path
    #[error("Invalid weather service URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::Timeout(err)
        } else {
            WeatherError::Network(err)
        }
    }
}

/// Source of raw weather response bytes
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs one request and returns the 200 OK body
    async fn fetch(&self) -> Result<Vec<u8>, WeatherError>;
}

/// Client for the provider's current conditions endpoint
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: Url,
    api_key: String,
    city: String,
    state: String,
}

impl WeatherClient {
    /// Creates a client for the configured location with the default timeout
    pub fn new(config: &Config) -> Result<Self, WeatherError> {
        Self::with_timeout(config, DEFAULT_FETCH_TIMEOUT)
    }

    /// Creates a client whose requests give up after `timeout`
    pub fn with_timeout(config: &Config, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parse_base_url(WUNDERGROUND_BASE_URL)?,
            api_key: config.api_key.clone(),
            city: config.city.clone(),
            state: config.state.clone(),
        })
    }

    /// Points the client at another server, e.g. a local mock
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, WeatherError> {
        self.base_url = parse_base_url(base_url.as_ref())?;
        Ok(self)
    }

    /// Conditions URL for the configured key and location.
    ///
    /// Key, state and city are each pushed as one path segment, so reserved
    /// characters in them are percent-encoded rather than reshaping the URL.
    pub fn conditions_url(&self) -> Result<Url, WeatherError> {
        let city_file = format!("{}.json", self.city);
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| WeatherError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend([
                "api",
                self.api_key.as_str(),
                "conditions",
                "q",
                self.state.as_str(),
                city_file.as_str(),
            ]);
        Ok(url)
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, WeatherError> {
    Url::parse(base_url).map_err(|e| WeatherError::InvalidUrl(format!("{}: {}", base_url, e)))
}

#[async_trait]
impl Fetcher for WeatherClient {
    #[instrument(skip(self), fields(city = %self.city, state = %self.state))]
    async fn fetch(&self) -> Result<Vec<u8>, WeatherError> {
        let response = self.client.get(self.conditions_url()?).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(WeatherError::Remote {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        debug!(bytes = body.len(), "fetched current conditions");
        Ok(body.to_vec())
    }
}

/// Parses a conditions response body into an `Observation` in `units`
pub fn parse_conditions(body: &[u8], units: Units) -> Result<Observation, WeatherError> {
    let response: ConditionsResponse = serde_json::from_slice(body)?;
    let current = response
        .current_observation
        .ok_or_else(|| WeatherError::MissingField("current_observation".to_string()))?;

    let temperature = match units {
        Units::Imperial => current.temp_f,
        Units::Metric => current.temp_c,
    };

    Ok(Observation {
        city: current.display_location.city,
        temperature,
        units,
        conditions: current.weather,
        humidity: current.relative_humidity,
    })
}

/// Conditions endpoint response
#[derive(Debug, Deserialize)]
struct ConditionsResponse {
    current_observation: Option<CurrentObservation>,
}

#[derive(Debug, Deserialize)]
struct DisplayLocation {
    city: String,
}

/// Current observation block
#[derive(Debug, Deserialize)]
struct CurrentObservation {
    display_location: DisplayLocation,
    temp_f: f64,
    temp_c: f64,
    #[serde(default)]
    relative_humidity: String,
    #[serde(default)]
    weather: String,
}
