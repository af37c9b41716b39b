//! Weather decision activity
//!
//! A Journey Builder custom decision activity: resolves a contact's
//! location, looks up the current weather on `OpenWeatherMap` and branches
//! the contact on whether the conditions are adverse.

pub mod api;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod models;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use classifier::{AdverseConditions, classify};
pub use config::ActivityConfig;
pub use error::ActivityError;
pub use location_resolver::{Geocoder, LocationResolver};
pub use models::{BranchResult, LocationInput, ResolvedCoordinate, WeatherObservation};
pub use weather::{OpenWeatherClient, ProviderReport, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ActivityError>;
