//! `OpenWeatherMap` API response structures and conversion utilities

use serde::Deserialize;

use crate::models::{ResolvedCoordinate, WeatherObservation};

/// Current weather response (`/data/2.5/weather`)
#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weather: Vec<WeatherEntry>,
    pub main: MainData,
    #[serde(default)]
    pub sys: Option<SysData>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherEntry {
    pub main: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct MainData {
    pub temp: f64,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
pub struct SysData {
    #[serde(default)]
    pub country: Option<String>,
}

/// Error body (`{"cod": "404", "message": "city not found"}`)
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Direct geocoding entry (`/geo/1.0/direct`)
#[derive(Debug, Deserialize)]
pub struct DirectGeocodingResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Zip geocoding response (`/geo/1.0/zip`)
#[derive(Debug, Deserialize)]
pub struct ZipGeocodingResult {
    pub zip: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
}

impl CurrentResponse {
    /// Observation from the first weather entry; `None` if the provider sent none
    #[must_use]
    pub fn observation(&self) -> Option<WeatherObservation> {
        let entry = self.weather.first()?;
        Some(WeatherObservation::new(
            &entry.main,
            &entry.description,
            self.main.temp,
            self.main.humidity,
        ))
    }

    #[must_use]
    pub fn country(&self) -> Option<String> {
        self.sys.as_ref().and_then(|sys| sys.country.clone())
    }
}

impl DirectGeocodingResult {
    #[must_use]
    pub fn coordinate(&self) -> Option<ResolvedCoordinate> {
        ResolvedCoordinate::new(self.lat, self.lon)
    }
}

impl ZipGeocodingResult {
    #[must_use]
    pub fn coordinate(&self) -> Option<ResolvedCoordinate> {
        ResolvedCoordinate::new(self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_response_to_observation() {
        let body = r#"{
            "coord": {"lon": -74.0, "lat": 40.7},
            "weather": [{"id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d"}],
            "main": {"temp": 12.64, "feels_like": 11.9, "humidity": 81},
            "sys": {"country": "US"},
            "name": "New York",
            "cod": 200
        }"#;
        let response: CurrentResponse = serde_json::from_str(body).unwrap();
        let observation = response.observation().unwrap();

        assert_eq!(observation.condition_main, "rain");
        assert_eq!(observation.description, "moderate rain");
        assert_eq!(observation.temperature_c, 13);
        assert_eq!(observation.humidity_pct, 81);
        assert_eq!(response.name.as_deref(), Some("New York"));
        assert_eq!(response.country().as_deref(), Some("US"));
    }

    #[test]
    fn test_empty_weather_array_has_no_observation() {
        let body = r#"{"weather": [], "main": {"temp": 20.0, "humidity": 40}}"#;
        let response: CurrentResponse = serde_json::from_str(body).unwrap();
        assert!(response.observation().is_none());
    }
}
