//! Activity lifecycle endpoints called by Journey Builder while a journey is
//! edited, validated, published and stopped

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{info, warn};

use super::AppState;
use crate::auth::extract_payload;
use crate::classifier::AdverseConditions;
use crate::error::ActivityError;
use crate::models::{ActivityPayload, LocationFieldType};

/// Problems with the configured `inArguments[0]`; empty when it is usable
#[must_use]
pub fn check_configuration(payload: &ActivityPayload) -> Vec<String> {
    let Some(args) = payload.arguments() else {
        return vec!["Activity has no inArguments".to_string()];
    };

    let mut errors = Vec::new();

    let has_text = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    let has_value = |value: &Option<serde_json::Value>| match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(text)) => !text.trim().is_empty(),
        Some(_) => true,
    };

    let has_location = has_value(&args.location_field)
        || (has_value(&args.latitude) && has_value(&args.longitude))
        || has_text(&args.city)
        || has_text(&args.postal_code);
    if !has_location {
        errors.push(
            "A location source is required: locationField, coordinates, city or postal code"
                .to_string(),
        );
    }

    if let Some(raw) = args.location_field_type.as_deref().filter(|t| !t.trim().is_empty()) {
        if let LocationFieldType::Unsupported(kind) = LocationFieldType::parse(raw) {
            errors.push(format!(
                "Unsupported locationFieldType '{kind}' (expected coordinates, zipcode, city or address)"
            ));
        }
    }

    if let Some(conditions) = args.weather_conditions.as_deref() {
        if AdverseConditions::parse(conditions).is_empty() {
            errors.push("weatherConditions must name at least one condition".to_string());
        }
    }

    errors
}

fn failure(status: StatusCode, error: String) -> Response {
    (status, Json(json!({ "success": false, "error": error }))).into_response()
}

fn auth_failure(e: &ActivityError) -> Response {
    warn!("Lifecycle request rejected: {}", e);
    failure(e.status_code(), e.user_message())
}

/// Verified payload and its configuration problems
fn checked(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(ActivityPayload, Vec<String>), ActivityError> {
    let payload = extract_payload(headers, body, &state.config.auth)?;
    let errors = check_configuration(&payload);
    Ok((payload, errors))
}

pub async fn save(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let (payload, errors) = match checked(&state, &headers, &body) {
        Ok(checked) => checked,
        Err(e) => return auth_failure(&e),
    };

    if !errors.is_empty() {
        return failure(StatusCode::BAD_REQUEST, errors.join("; "));
    }

    info!(
        "Configuration saved for activity {}",
        payload.activity_object_id.as_deref().unwrap_or("<unknown>")
    );
    Json(json!({
        "success": true,
        "message": "Configuration saved successfully",
        "configuration": payload.arguments(),
    }))
    .into_response()
}

pub async fn validate(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    match checked(&state, &headers, &body) {
        Ok((_, errors)) => {
            if !errors.is_empty() {
                info!("Activity configuration invalid: {}", errors.join("; "));
            }
            Json(json!({ "valid": errors.is_empty(), "errors": errors })).into_response()
        }
        Err(e) => {
            warn!("Validate request rejected: {}", e);
            (
                e.status_code(),
                Json(json!({ "valid": false, "errors": [e.user_message()] })),
            )
                .into_response()
        }
    }
}

pub async fn publish(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let (payload, errors) = match checked(&state, &headers, &body) {
        Ok(checked) => checked,
        Err(e) => return auth_failure(&e),
    };

    if !errors.is_empty() {
        return failure(StatusCode::BAD_REQUEST, errors.join("; "));
    }

    info!(
        "Activity published in journey {}",
        payload.journey_id.as_deref().unwrap_or("<unknown>")
    );
    Json(json!({ "success": true, "message": "Activity published successfully" })).into_response()
}

/// Nothing to tear down; the service keeps no per-journey state
pub async fn stop() -> Json<serde_json::Value> {
    info!("Activity stopped");
    Json(json!({ "success": true, "message": "Activity stopped successfully" }))
}
