//! Weather observation and branch outcome

use serde::{Deserialize, Serialize};

/// Current conditions as reported by the provider, normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Lowercased condition keyword (e.g. "rain", "thunderstorm")
    pub condition_main: String,
    /// Human-readable description of weather conditions
    pub description: String,
    /// Temperature in Celsius, rounded
    pub temperature_c: i32,
    /// Relative humidity in percent (0-100)
    pub humidity_pct: u8,
}

impl WeatherObservation {
    #[must_use]
    pub fn new(condition_main: &str, description: &str, temperature: f64, humidity: u8) -> Self {
        Self {
            condition_main: condition_main.trim().to_lowercase(),
            description: description.to_string(),
            temperature_c: round_temperature(temperature),
            humidity_pct: humidity,
        }
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature_c)
    }
}

/// Nearest whole degree, halves rounded up (-2.5 becomes -2)
#[allow(clippy::cast_possible_truncation)]
fn round_temperature(celsius: f64) -> i32 {
    if celsius.is_finite() {
        (celsius + 0.5).floor().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
    } else {
        0
    }
}

/// Outcome returned to Journey Builder; selects the downstream path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchResult {
    #[serde(rename = "Adverse Weather")]
    AdverseWeather,
    #[serde(rename = "Good Weather")]
    GoodWeather,
}

impl BranchResult {
    /// Label as configured on the activity's outcomes
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            BranchResult::AdverseWeather => "Adverse Weather",
            BranchResult::GoodWeather => "Good Weather",
        }
    }
}

impl std::fmt::Display for BranchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
