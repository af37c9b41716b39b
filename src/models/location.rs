//! Location input variants and resolved coordinates

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::activity::InArguments;
use crate::error::ActivityError;

/// Where a contact is, in whichever shape the activity received it.
/// Built once per request by [`LocationInput::from_arguments`].
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Coordinates { latitude: f64, longitude: f64 },
    CityState { city: String, state: String, country: String },
    PostalCode { postal_code: String, country: String },
    CityOnly { city: String },
    Opaque(OpaqueField),
}

/// A single `locationField` value plus its type tag
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueField {
    pub value: OpaqueValue,
    pub kind: LocationFieldType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OpaqueValue {
    Text(String),
    Object(Map<String, Value>),
}

/// Type tag chosen for `locationField` in the configuration panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationFieldType {
    Coordinates,
    Zipcode,
    City,
    Address,
    Unsupported(String),
}

impl LocationFieldType {
    /// Parse the configured tag, case-insensitively
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "coordinates" => Self::Coordinates,
            "zipcode" => Self::Zipcode,
            "city" => Self::City,
            "address" => Self::Address,
            _ => Self::Unsupported(raw.trim().to_string()),
        }
    }

    /// Guess the tag for an untagged text value: a coordinate pair, then a
    /// postal code, otherwise a place name
    #[must_use]
    pub fn infer(text: &str) -> Self {
        if parse_coordinate_pair(text).is_some() {
            Self::Coordinates
        } else if is_postal_code(text) {
            Self::Zipcode
        } else {
            Self::City
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Coordinates => "coordinates",
            Self::Zipcode => "zipcode",
            Self::City => "city",
            Self::Address => "address",
            Self::Unsupported(raw) => raw,
        }
    }
}

impl fmt::Display for LocationFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LocationInput {
    /// Pick the single location variant for this request.
    ///
    /// Priority is fixed: coordinates, city + state, postal code, city,
    /// then the opaque `locationField`.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::MissingLocation`] carrying every received
    /// location field when none of the shapes is present.
    pub fn from_arguments(args: &InArguments, default_country: &str) -> Result<Self, ActivityError> {
        let country = present(args.country.as_deref())
            .unwrap_or(default_country)
            .to_string();

        let coordinates = args
            .latitude
            .as_ref()
            .and_then(numeric)
            .zip(args.longitude.as_ref().and_then(numeric))
            .filter(|(lat, lon)| ResolvedCoordinate::new(*lat, *lon).is_some());
        if let Some((latitude, longitude)) = coordinates {
            return Ok(Self::Coordinates { latitude, longitude });
        }

        let city = present(args.city.as_deref());
        if let (Some(city), Some(state)) = (city, present(args.state.as_deref())) {
            return Ok(Self::CityState {
                city: city.to_string(),
                state: state.to_string(),
                country,
            });
        }

        if let Some(postal_code) = present(args.postal_code.as_deref()) {
            return Ok(Self::PostalCode {
                postal_code: postal_code.to_string(),
                country,
            });
        }

        if let Some(city) = city {
            return Ok(Self::CityOnly {
                city: city.to_string(),
            });
        }

        if let Some(field) = opaque_field(args) {
            return Ok(Self::Opaque(field));
        }

        Err(ActivityError::missing_location(args.received_location()))
    }
}

fn opaque_field(args: &InArguments) -> Option<OpaqueField> {
    let value = match args.location_field.as_ref()? {
        Value::String(text) => OpaqueValue::Text(present(Some(text.as_str()))?.to_string()),
        Value::Number(number) => OpaqueValue::Text(number.to_string()),
        Value::Object(map) if !map.is_empty() => OpaqueValue::Object(map.clone()),
        _ => return None,
    };

    let kind = match (present(args.location_field_type.as_deref()), &value) {
        (Some(raw), _) => LocationFieldType::parse(raw),
        (None, OpaqueValue::Text(text)) => LocationFieldType::infer(text),
        (None, OpaqueValue::Object(_)) => LocationFieldType::Coordinates,
    };

    Some(OpaqueField { value, kind })
}

/// Latitude/longitude pair within valid Earth ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCoordinate {
    lat: f64,
    lon: f64,
}

impl ResolvedCoordinate {
    /// Returns `None` unless both values are finite and in range
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Name-based lookup handed to the weather provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    /// `q=` search, e.g. "Denver,CO,US"
    Name(String),
    /// `zip=` search, e.g. "80202,US"
    PostalCode(String),
}

/// What the resolver produces: a coordinate or a query the provider resolves
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLocation {
    Coordinate(ResolvedCoordinate),
    Query(LocationQuery),
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedLocation::Coordinate(c) => write!(f, "({})", c.format_coordinates()),
            ResolvedLocation::Query(LocationQuery::Name(name)) => write!(f, "name '{name}'"),
            ResolvedLocation::Query(LocationQuery::PostalCode(zip)) => write!(f, "zip '{zip}'"),
        }
    }
}

/// Parse `"lat,lon"`: exactly two comma-separated numbers in range
#[must_use]
pub fn parse_coordinate_pair(input: &str) -> Option<ResolvedCoordinate> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return None;
    }
    let lat = parts[0].parse::<f64>().ok()?;
    let lon = parts[1].parse::<f64>().ok()?;
    ResolvedCoordinate::new(lat, lon)
}

/// Number, or string holding a number
#[must_use]
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Blank strings count as absent: unbound attributes arrive as ""
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Check if input looks like a postal code
fn is_postal_code(input: &str) -> bool {
    let normalized = input.replace([' ', '-'], "");

    // US ZIP codes: 5 or 9 digits
    if normalized.len() == 5 || normalized.len() == 9 {
        return normalized.chars().all(|c| c.is_ascii_digit());
    }

    // Alphanumeric postal codes must contain digits
    (3..=10).contains(&normalized.len())
        && normalized.chars().all(|c| c.is_ascii_alphanumeric())
        && normalized.chars().any(|c| c.is_ascii_digit())
        && normalized.chars().any(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> InArguments {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_coordinates_win_over_city_state() {
        let input = LocationInput::from_arguments(
            &args(json!({"latitude": 40.7, "longitude": -74.0, "city": "Chicago", "state": "IL"})),
            "US",
        )
        .unwrap();
        assert_eq!(
            input,
            LocationInput::Coordinates {
                latitude: 40.7,
                longitude: -74.0
            }
        );
    }

    #[test]
    fn test_string_coordinates_are_accepted() {
        let input =
            LocationInput::from_arguments(&args(json!({"latitude": " 47.6", "longitude": "-122.3"})), "US")
                .unwrap();
        assert!(matches!(input, LocationInput::Coordinates { .. }));
    }

    #[test]
    fn test_invalid_coordinates_fall_through() {
        let input = LocationInput::from_arguments(
            &args(json!({"latitude": "abc", "longitude": "-74.0", "postalCode": "10001"})),
            "US",
        )
        .unwrap();
        assert_eq!(
            input,
            LocationInput::PostalCode {
                postal_code: "10001".to_string(),
                country: "US".to_string()
            }
        );

        let out_of_range = LocationInput::from_arguments(
            &args(json!({"latitude": 91.0, "longitude": 0.0, "city": "Oslo"})),
            "US",
        )
        .unwrap();
        assert!(matches!(out_of_range, LocationInput::CityOnly { .. }));
    }

    #[test]
    fn test_city_state_beats_postal_code() {
        let input = LocationInput::from_arguments(
            &args(json!({"city": "Denver", "state": "CO", "postalCode": "80202", "country": "US"})),
            "US",
        )
        .unwrap();
        assert!(matches!(input, LocationInput::CityState { .. }));
    }

    #[test]
    fn test_default_country_applied() {
        let input =
            LocationInput::from_arguments(&args(json!({"postalCode": "SW1A 1AA", "country": "  "})), "GB")
                .unwrap();
        assert_eq!(
            input,
            LocationInput::PostalCode {
                postal_code: "SW1A 1AA".to_string(),
                country: "GB".to_string()
            }
        );
    }

    #[test]
    fn test_opaque_field_with_type() {
        let input = LocationInput::from_arguments(
            &args(json!({"locationField": "40.7,-74.0", "locationFieldType": "Coordinates"})),
            "US",
        )
        .unwrap();
        assert_eq!(
            input,
            LocationInput::Opaque(OpaqueField {
                value: OpaqueValue::Text("40.7,-74.0".to_string()),
                kind: LocationFieldType::Coordinates,
            })
        );
    }

    #[test]
    fn test_opaque_field_type_inferred() {
        let cases = [
            ("40.7,-74.0", LocationFieldType::Coordinates),
            ("80202", LocationFieldType::Zipcode),
            ("SW1A 1AA", LocationFieldType::Zipcode),
            ("Interlaken", LocationFieldType::City),
            ("New York City", LocationFieldType::City),
        ];
        for (value, expected) in cases {
            let input =
                LocationInput::from_arguments(&args(json!({"locationField": value})), "US").unwrap();
            let LocationInput::Opaque(field) = input else {
                panic!("expected opaque field for {value}");
            };
            assert_eq!(field.kind, expected, "value {value}");
        }
    }

    #[test]
    fn test_empty_input_is_missing_location() {
        let err = LocationInput::from_arguments(&args(json!({})), "US").unwrap_err();
        assert!(matches!(err, ActivityError::MissingLocation { .. }));

        let blanks = args(json!({"city": "", "state": " ", "locationField": ""}));
        let err = LocationInput::from_arguments(&blanks, "US").unwrap_err();
        let ActivityError::MissingLocation { received } = err else {
            panic!("expected MissingLocation");
        };
        assert_eq!(received.city.as_deref(), Some(""));
        assert_eq!(received.state.as_deref(), Some(" "));
    }

    #[test]
    fn test_parse_coordinate_pair() {
        let c = parse_coordinate_pair(" 46.8182 , 8.2275 ").unwrap();
        assert_eq!(c.lat(), 46.8182);
        assert_eq!(c.lon(), 8.2275);

        assert!(parse_coordinate_pair("not-a-pair").is_none());
        assert!(parse_coordinate_pair("46.0").is_none());
        assert!(parse_coordinate_pair("46.0,8.0,0.0").is_none());
        assert!(parse_coordinate_pair("91.0,8.0").is_none());
        assert!(parse_coordinate_pair("46.0,-181.0").is_none());
    }

    #[test]
    fn test_postal_code_detection() {
        assert!(is_postal_code("12345"));
        assert!(is_postal_code("12345-6789"));
        assert!(is_postal_code("CH8001"));
        assert!(is_postal_code("SW1A1AA"));

        assert!(!is_postal_code("Interlaken"));
        assert!(!is_postal_code("1234"));
        assert!(!is_postal_code("12345678901"));
    }

    #[test]
    fn test_location_field_type_parse() {
        assert_eq!(LocationFieldType::parse(" ZipCode "), LocationFieldType::Zipcode);
        assert_eq!(
            LocationFieldType::parse("geohash"),
            LocationFieldType::Unsupported("geohash".to_string())
        );
    }
}
