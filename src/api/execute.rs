//! `POST /execute`: decide the branch for one contact

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use tracing::{info, warn};

use super::AppState;
use crate::auth::extract_payload;
use crate::classifier::{AdverseConditions, classify};
use crate::error::ActivityError;
use crate::location_resolver::LocationResolver;
use crate::models::{BranchResult, ExecuteResponse, LocationInput, WeatherSummary};

pub async fn execute(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    match decide(&state, &headers, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            warn!(
                "Execute failed ({}), defaulting to {}: {}",
                e.status_code(),
                BranchResult::GoodWeather,
                e
            );
            e.into_response()
        }
    }
}

/// The single decision pipeline: auth, location, weather, classification
pub async fn decide(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<ExecuteResponse, ActivityError> {
    let start_time = Instant::now();
    let config = &state.config;
    config.ensure_execute_ready()?;

    let payload = extract_payload(headers, body, &config.auth)?;
    let args = payload
        .arguments()
        .ok_or_else(|| ActivityError::invalid_request("Request has no inArguments"))?;

    let input = LocationInput::from_arguments(args, &config.defaults.country)?;
    let resolved =
        LocationResolver::resolve(input, state.geocoder.as_ref(), &config.defaults.country).await?;

    let report = state.weather.current_weather(&resolved).await?;

    let conditions = AdverseConditions::from_request(
        args.weather_conditions.as_deref(),
        &config.defaults.adverse_conditions,
    );
    let branch = classify(&report.observation, &conditions);

    info!(
        "Contact {} at {}: {} -> {} in {:.3}s",
        args.contact_key.as_deref().unwrap_or("<unknown>"),
        resolved,
        report.observation.condition_main,
        branch,
        start_time.elapsed().as_secs_f64()
    );

    let observation = report.observation;
    Ok(ExecuteResponse {
        branch_result: branch,
        weather_api_response: WeatherSummary::new(
            &observation,
            report.location_name,
            report.country,
        ),
        weather_condition: observation.condition_main,
        temperature: observation.temperature_c,
        humidity: observation.humidity_pct,
        description: observation.description,
        contact_key: args.contact_key.clone(),
        email_address: args.email_address.clone(),
        location_used: args.received_location(),
    })
}
