//! Journey Builder request and response payloads

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::weather::{BranchResult, WeatherObservation};

/// Body Journey Builder posts to every activity endpoint (or the claims of
/// the signed token carrying it)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload {
    #[serde(default)]
    pub in_arguments: Vec<InArguments>,
    #[serde(rename = "activityObjectID", default)]
    pub activity_object_id: Option<String>,
    #[serde(default)]
    pub journey_id: Option<String>,
    #[serde(default)]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub definition_instance_id: Option<String>,
    #[serde(default)]
    pub key_value: Option<String>,
    #[serde(default)]
    pub mode: Option<Value>,
}

impl ActivityPayload {
    /// The first (and only meaningful) argument block
    #[must_use]
    pub fn arguments(&self) -> Option<&InArguments> {
        self.in_arguments.first()
    }
}

/// `inArguments[0]` as configured in the activity. Every field is optional
/// because data-binding expressions may resolve to nothing for a contact.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InArguments {
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_key: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub email_address: Option<String>,
    /// Number or numeric string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Value>,
    /// Number or numeric string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Value>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub postal_code: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<String>,
    /// String or structured object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_field: Option<Value>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub location_field_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub weather_conditions: Option<String>,
}

impl InArguments {
    /// Location-related fields, for diagnostics and echoing back
    #[must_use]
    pub fn received_location(&self) -> ReceivedLocation {
        ReceivedLocation {
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
            location_field: self.location_field.clone(),
            location_field_type: self.location_field_type.clone(),
        }
    }
}

/// Data bindings may resolve to numbers (a numeric ZIP, say); keep them as
/// text. Arrays and objects count as absent.
fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

/// Snapshot of every location field received, empty or not
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_field: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_field_type: Option<String>,
}

/// Successful `/execute` body. `branchResult` drives the journey split, the
/// remaining fields feed the activity's out-arguments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub branch_result: BranchResult,
    pub weather_condition: String,
    pub temperature: i32,
    pub humidity: u8,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    pub location_used: ReceivedLocation,
    pub weather_api_response: WeatherSummary,
}

/// Condensed view of what the provider reported
#[derive(Debug, Clone, Serialize)]
pub struct WeatherSummary {
    pub location: Option<String>,
    pub country: Option<String>,
    pub condition: String,
    pub temp: i32,
    pub humidity: u8,
}

impl WeatherSummary {
    #[must_use]
    pub fn new(
        observation: &WeatherObservation,
        location: Option<String>,
        country: Option<String>,
    ) -> Self {
        Self {
            location,
            country,
            condition: observation.condition_main.clone(),
            temp: observation.temperature_c,
            humidity: observation.humidity_pct,
        }
    }
}
