//! Configuration management for the weather decision activity
//!
//! Handles loading configuration from a TOML file and environment variables,
//! and provides validation for all configuration settings. Loaded once at
//! start-up; handlers only ever see the resulting [`ActivityConfig`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ActivityError;
use crate::classifier::DEFAULT_ADVERSE_CONDITIONS;

/// Legacy variable names still honoured for the two secrets
const LEGACY_API_KEY_VAR: &str = "OPENWEATHER_KEY";
const LEGACY_JWT_SECRET_VAR: &str = "JWT_SECRET";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Token verification settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-request fallbacks
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// OpenWeatherMap API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key; `/execute` refuses to run without it
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL for the current-weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_url: String,
    /// Outbound request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// Signed-token verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Deployment policy: require a valid `x-jwt-assertion` on activity calls
    #[serde(default = "default_verify_jwt")]
    pub verify_jwt: bool,
    /// Shared HMAC signing secret from the installed package
    #[serde(default)]
    pub jwt_secret: Option<String>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally reachable URL, used for endpoint URLs in `config.json`
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Directory holding `index.html`, `edit.html` and UI assets
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Per-request timeout applied by the server
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// PEM certificate; with `tls_key_path` enables HTTPS
    #[serde(default)]
    pub tls_cert_path: Option<String>,
    #[serde(default)]
    pub tls_key_path: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Fallbacks applied when a request leaves a setting out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Adverse categories when `weatherConditions` is absent
    #[serde(default = "default_adverse_conditions")]
    pub adverse_conditions: String,
    /// Country appended to city/state and postal-code lookups
    #[serde(default = "default_country")]
    pub country: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_verify_jwt() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_request_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_adverse_conditions() -> String {
    DEFAULT_ADVERSE_CONDITIONS.to_string()
}

fn default_country() -> String {
    "US".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            geocoding_url: default_geocoding_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verify_jwt: default_verify_jwt(),
            jwt_secret: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
            static_dir: default_static_dir(),
            request_timeout_seconds: default_request_timeout(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            adverse_conditions: default_adverse_conditions(),
            country: default_country(),
        }
    }
}

impl ActivityConfig {
    /// Load configuration from `path` (default `config.toml`) and
    /// environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHER_ACTIVITY_WEATHER__API_KEY, WEATHER_ACTIVITY_AUTH__VERIFY_JWT, ...
        builder = builder.add_source(
            Environment::with_prefix("WEATHER_ACTIVITY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ActivityConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_legacy_secrets(
            std::env::var(LEGACY_API_KEY_VAR).ok(),
            std::env::var(LEGACY_JWT_SECRET_VAR).ok(),
        );

        config.apply_defaults();

        config.validate()?;

        Ok(config)
    }

    /// Fill unset secrets from the legacy variables
    pub fn apply_legacy_secrets(&mut self, api_key: Option<String>, jwt_secret: Option<String>) {
        if self.weather.api_key.is_none() {
            self.weather.api_key = api_key;
        }
        if self.auth.jwt_secret.is_none() {
            self.auth.jwt_secret = jwt_secret;
        }
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.geocoding_url.is_empty() {
            self.weather.geocoding_url = default_geocoding_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.adverse_conditions.trim().is_empty() {
            self.defaults.adverse_conditions = default_adverse_conditions();
        }
        if self.defaults.country.trim().is_empty() {
            self.defaults.country = default_country();
        }
        // Blank secrets are the same as absent ones
        self.weather.api_key = self.weather.api_key.take().filter(|k| !k.trim().is_empty());
        self.auth.jwt_secret = self.auth.jwt_secret.take().filter(|s| !s.is_empty());
        self.server.public_url = self.server.public_url.trim_end_matches('/').to_string();
    }

    /// Validate all configuration settings.
    ///
    /// Missing secrets are not an error here: the service still starts and
    /// `/execute` answers "not configured" until they are provided.
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Secrets `/execute` cannot run without
    pub fn ensure_execute_ready(&self) -> std::result::Result<(), ActivityError> {
        if self.weather.api_key.is_none() {
            return Err(ActivityError::configuration("Weather API key not configured"));
        }
        if self.auth.verify_jwt && self.auth.jwt_secret.is_none() {
            return Err(ActivityError::configuration(
                "JWT verification is enabled but no signing secret is configured",
            ));
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(ActivityError::configuration(
                "Weather API timeout cannot exceed 300 seconds",
            )
            .into());
        }

        if self.server.request_timeout_seconds > 300 {
            return Err(ActivityError::configuration(
                "Server request timeout cannot exceed 300 seconds",
            )
            .into());
        }

        if self.server.port == 0 {
            return Err(ActivityError::configuration("Server port cannot be 0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ActivityError::configuration(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ActivityError::configuration(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather API base URL", &self.weather.base_url),
            ("Geocoding API base URL", &self.weather.geocoding_url),
            ("Public URL", &self.server.public_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ActivityError::configuration(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.server.tls_cert_path.is_some() != self.server.tls_key_path.is_some() {
            return Err(ActivityError::configuration(
                "TLS needs both tls_cert_path and tls_key_path",
            )
            .into());
        }

        Ok(())
    }
}
