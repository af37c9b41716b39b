//! Journey Builder activity endpoints

pub mod descriptor;
pub mod execute;
pub mod lifecycle;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::ActivityConfig;
use crate::location_resolver::Geocoder;
use crate::weather::{OpenWeatherClient, WeatherProvider};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ActivityConfig>,
    pub weather: Arc<dyn WeatherProvider>,
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    /// State backed by a single `OpenWeatherMap` client for both lookups
    pub fn new(config: ActivityConfig) -> crate::Result<Self> {
        let client = Arc::new(OpenWeatherClient::new(&config.weather)?);
        Ok(Self {
            config: Arc::new(config),
            weather: client.clone(),
            geocoder: client,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/execute", post(execute::execute))
        .route("/save", post(lifecycle::save))
        .route("/validate", post(lifecycle::validate))
        .route("/publish", post(lifecycle::publish))
        .route("/stop", post(lifecycle::stop))
        .route("/config.json", get(descriptor::config_json))
        .with_state(state)
}
