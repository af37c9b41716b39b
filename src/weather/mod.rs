//! Weather API client for `OpenWeatherMap`
//!
//! One GET per lookup: no retries, no caching, no rate limiting. Journey
//! Builder's own timeout/retry settings govern the caller side.

pub mod openweather;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::error::ActivityError;
use crate::location_resolver::Geocoder;
use crate::models::{
    LocationFieldType, LocationQuery, ResolvedCoordinate, ResolvedLocation, WeatherObservation,
};

/// What the provider reported for one lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReport {
    pub observation: WeatherObservation,
    /// Place name the provider matched
    pub location_name: Option<String>,
    pub country: Option<String>,
}

/// Current-conditions lookup
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(
        &self,
        location: &ResolvedLocation,
    ) -> Result<ProviderReport, ActivityError>;
}

/// `OpenWeatherMap` client for current weather and geocoding
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    /// HTTP client
    client: Client,
    api_key: Option<String>,
    base_url: String,
    geocoding_url: String,
}

impl OpenWeatherClient {
    /// Create a new client from the weather configuration
    pub fn new(config: &WeatherConfig) -> Result<Self, ActivityError> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weather-decision/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ActivityError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            geocoding_url: config.geocoding_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_key(&self) -> Result<&str, ActivityError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ActivityError::configuration("Weather API key not configured"))
    }

    /// Current weather URL for a resolved location
    fn weather_url(&self, location: &ResolvedLocation, api_key: &str) -> String {
        let selector = match location {
            ResolvedLocation::Coordinate(c) => format!("lat={}&lon={}", c.lat(), c.lon()),
            ResolvedLocation::Query(LocationQuery::Name(name)) => {
                format!("q={}", urlencoding::encode(name))
            }
            ResolvedLocation::Query(LocationQuery::PostalCode(zip)) => {
                format!("zip={}", urlencoding::encode(zip))
            }
        };
        format!(
            "{}/weather?{}&appid={}&units=metric",
            self.base_url,
            selector,
            urlencoding::encode(api_key)
        )
    }

    /// Send one GET and decode the body.
    ///
    /// Returns `Ok(None)` for a 404 when `not_found_is_empty` is set (the
    /// zip geocoder answers 404 for unknown codes).
    #[instrument(skip(self, url), fields(url = %redact(url)))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        not_found_is_empty: bool,
    ) -> Result<Option<T>, ActivityError> {
        let start_time = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Network error calling OpenWeatherMap: {}", e);
            ActivityError::provider(format!("Network error: {e}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ActivityError::provider(format!("Failed to read response body: {e}"))
        })?;

        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if status == StatusCode::NOT_FOUND && not_found_is_empty {
            return Ok(None);
        }

        if !status.is_success() {
            let message = serde_json::from_str::<openweather::ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Location not found")
                        .to_string()
                });
            warn!("OpenWeatherMap returned {}: {}", status, message);
            let err = ActivityError::provider_status(status.as_u16(), message);
            return Err(match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(response) => err.with_response(response),
                Err(_) => err,
            });
        }

        if start_time.elapsed().as_secs() > 5 {
            warn!(
                "Slow API response detected: {:.3}s",
                start_time.elapsed().as_secs_f64()
            );
        }

        serde_json::from_str(&body).map(Some).map_err(|e| {
            error!("Failed to parse OpenWeatherMap response: {}", e);
            ActivityError::provider(format!("Invalid data received from OpenWeatherMap: {e}"))
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self, location), fields(location = %location))]
    async fn current_weather(
        &self,
        location: &ResolvedLocation,
    ) -> Result<ProviderReport, ActivityError> {
        let api_key = self.api_key()?;
        info!("Getting current weather for {}", location);

        let url = self.weather_url(location, api_key);
        let response: openweather::CurrentResponse = self
            .get_json(&url, false)
            .await?
            .ok_or_else(|| ActivityError::provider("Empty weather response"))?;

        let observation = response
            .observation()
            .ok_or_else(|| ActivityError::provider("No weather conditions in response"))?;

        info!(
            "Current weather at {}: {} ({}), {}",
            response.name.as_deref().unwrap_or("unknown"),
            observation.condition_main,
            observation.description,
            observation.format_temperature()
        );

        Ok(ProviderReport {
            country: response.country(),
            location_name: response.name,
            observation,
        })
    }
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn geocode(
        &self,
        query: &str,
        kind: &LocationFieldType,
    ) -> Result<Option<ResolvedCoordinate>, ActivityError> {
        let api_key = urlencoding::encode(self.api_key()?).into_owned();
        info!("Geocoding {} '{}'", kind, query);

        let coordinate = match kind {
            LocationFieldType::Zipcode => {
                let url = format!(
                    "{}/zip?zip={}&appid={}",
                    self.geocoding_url,
                    urlencoding::encode(query),
                    api_key
                );
                self.get_json::<openweather::ZipGeocodingResult>(&url, true)
                    .await?
                    .and_then(|result| {
                        debug!("Zip {} matched {}", result.zip, result.name);
                        result.coordinate()
                    })
            }
            LocationFieldType::City | LocationFieldType::Address => {
                let url = format!(
                    "{}/direct?q={}&limit=1&appid={}",
                    self.geocoding_url,
                    urlencoding::encode(query),
                    api_key
                );
                self.get_json::<Vec<openweather::DirectGeocodingResult>>(&url, false)
                    .await?
                    .unwrap_or_default()
                    .into_iter()
                    .next()
                    .and_then(|result| {
                        debug!(
                            "'{}' matched {}{}",
                            query,
                            result.name,
                            result
                                .state
                                .as_deref()
                                .map(|s| format!(", {s}"))
                                .unwrap_or_default()
                        );
                        result.coordinate()
                    })
            }
            LocationFieldType::Coordinates | LocationFieldType::Unsupported(_) => {
                return Err(ActivityError::geocode(format!(
                    "Geocoding does not support type '{kind}'"
                )));
            }
        };

        if coordinate.is_none() {
            warn!("No geocoding results found for '{}'", query);
        }
        Ok(coordinate)
    }
}

/// Strip the API key before a URL reaches the logs
fn redact(url: &str) -> String {
    match url.find("appid=") {
        Some(start) => {
            let value_start = start + "appid=".len();
            let value_end = url[value_start..]
                .find('&')
                .map_or(url.len(), |i| value_start + i);
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}
