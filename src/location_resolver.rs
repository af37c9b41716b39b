//! Location Resolution Module
//!
//! Turns a [`LocationInput`] into either a coordinate or a query string the
//! weather provider can look up by name or postal code. Opaque location
//! fields that are not coordinates go through a single geocoding call.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ActivityError;
use crate::models::location::{numeric, parse_coordinate_pair};
use crate::models::{
    LocationFieldType, LocationInput, LocationQuery, OpaqueField, OpaqueValue, ResolvedCoordinate,
    ResolvedLocation,
};

/// Name/postal-code to coordinate lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// First matching coordinate, or `None` when the provider has no match
    async fn geocode(
        &self,
        query: &str,
        kind: &LocationFieldType,
    ) -> Result<Option<ResolvedCoordinate>, ActivityError>;
}

/// Service for resolving location inputs
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a location input for the weather lookup
    pub async fn resolve(
        input: LocationInput,
        geocoder: &dyn Geocoder,
        default_country: &str,
    ) -> Result<ResolvedLocation, ActivityError> {
        debug!("Resolving location input: {:?}", input);

        let resolved = match input {
            LocationInput::Coordinates {
                latitude,
                longitude,
            } => ResolvedCoordinate::new(latitude, longitude)
                .map(ResolvedLocation::Coordinate)
                .ok_or_else(|| {
                    ActivityError::unresolvable(format!(
                        "Coordinates out of range: {latitude}, {longitude}"
                    ))
                })?,
            LocationInput::CityState {
                city,
                state,
                country,
            } => ResolvedLocation::Query(LocationQuery::Name(format!("{city},{state},{country}"))),
            LocationInput::PostalCode {
                postal_code,
                country,
            } => ResolvedLocation::Query(LocationQuery::PostalCode(format!(
                "{postal_code},{country}"
            ))),
            LocationInput::CityOnly { city } => ResolvedLocation::Query(LocationQuery::Name(city)),
            LocationInput::Opaque(field) => {
                Self::resolve_opaque(field, geocoder, default_country).await?
            }
        };

        debug!("Resolved location: {}", resolved);
        Ok(resolved)
    }

    async fn resolve_opaque(
        field: OpaqueField,
        geocoder: &dyn Geocoder,
        default_country: &str,
    ) -> Result<ResolvedLocation, ActivityError> {
        let OpaqueField { value, kind } = field;

        if kind == LocationFieldType::Coordinates {
            return Self::resolve_coordinate_value(&value).map(ResolvedLocation::Coordinate);
        }

        if let LocationFieldType::Unsupported(raw) = &kind {
            return Err(ActivityError::geocode(format!(
                "Unsupported location field type '{raw}'"
            )));
        }

        let OpaqueValue::Text(text) = value else {
            return Err(ActivityError::unresolvable(format!(
                "Structured location values are only supported for coordinates, not {kind}"
            )));
        };

        let query = match kind {
            LocationFieldType::Zipcode if !text.contains(',') => format!("{text},{default_country}"),
            _ => text,
        };

        debug!("Geocoding {} value: {}", kind, query);
        match geocoder.geocode(&query, &kind).await {
            Ok(Some(coordinate)) => {
                debug!(
                    "Geocoded '{}' to ({})",
                    query,
                    coordinate.format_coordinates()
                );
                Ok(ResolvedLocation::Coordinate(coordinate))
            }
            Ok(None) => {
                warn!("No geocoding results found for '{}'", query);
                Err(ActivityError::geocode(format!("No results for {kind} '{query}'")))
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", query, e);
                Err(ActivityError::geocode(format!(
                    "Lookup for {kind} '{query}' failed: {e}"
                )))
            }
        }
    }

    /// Coordinates from `"lat,lon"` text or a `{latitude|lat, longitude|lng|lon}` object
    fn resolve_coordinate_value(value: &OpaqueValue) -> Result<ResolvedCoordinate, ActivityError> {
        match value {
            OpaqueValue::Text(text) => parse_coordinate_pair(text).ok_or_else(|| {
                ActivityError::unresolvable(format!(
                    "Coordinates must be in format 'lat,lon', got '{text}'"
                ))
            }),
            OpaqueValue::Object(map) => {
                let lat = first_number(map, &["latitude", "lat"]);
                let lon = first_number(map, &["longitude", "lng", "lon"]);
                lat.zip(lon)
                    .and_then(|(lat, lon)| ResolvedCoordinate::new(lat, lon))
                    .ok_or_else(|| {
                        ActivityError::unresolvable(
                            "Coordinate object needs numeric latitude/lat and longitude/lng/lon",
                        )
                    })
            }
        }
    }
}

/// Value of the first key present; a present but non-numeric value does not
/// fall through to the next key
fn first_number(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
        .and_then(numeric)
}
