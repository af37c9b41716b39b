//! Error types and HTTP conversion for the weather decision activity

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::models::{BranchResult, ReceivedLocation};

/// Main error type for the weather decision activity
#[derive(Error, Debug)]
pub enum ActivityError {
    /// A required secret or API key is absent
    #[error("Service not configured: {message}")]
    ConfigurationMissing { message: String },

    /// Token missing, malformed or signed with the wrong secret
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Body could not be parsed or carries no arguments
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// No location data in any recognized shape
    #[error("Missing location data - need city, postal code, or coordinates")]
    MissingLocation { received: Box<ReceivedLocation> },

    /// Location data present but not parseable into a coordinate
    #[error("Unresolvable location: {message}")]
    Unresolvable { message: String },

    /// Geocoding returned nothing, failed, or the type is unsupported
    #[error("Geocoding failed: {message}")]
    GeocodeFailed { message: String },

    /// Weather provider rejected the call or answered with unusable data
    #[error("Weather API error: {message}")]
    Provider {
        message: String,
        /// Upstream HTTP status when the provider answered at all
        status: Option<u16>,
        /// Upstream error body, echoed back for debugging
        response: Option<Box<Value>>,
    },
}

impl ActivityError {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationMissing {
            message: message.into(),
        }
    }

    /// Create a new authentication error
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }

    /// Create a new request validation error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn missing_location(received: ReceivedLocation) -> Self {
        Self::MissingLocation {
            received: Box::new(received),
        }
    }

    pub fn unresolvable<S: Into<String>>(message: S) -> Self {
        Self::Unresolvable {
            message: message.into(),
        }
    }

    pub fn geocode<S: Into<String>>(message: S) -> Self {
        Self::GeocodeFailed {
            message: message.into(),
        }
    }

    /// Provider answered with a non-success status
    pub fn provider_status<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Provider {
            message: message.into(),
            status: Some(status),
            response: None,
        }
    }

    /// Attach the provider's error body to a provider error
    #[must_use]
    pub fn with_response(self, body: Value) -> Self {
        match self {
            Self::Provider {
                message, status, ..
            } => Self::Provider {
                message,
                status,
                response: Some(Box::new(body)),
            },
            other => other,
        }
    }

    /// Provider could not be reached or its body could not be decoded
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
            status: None,
            response: None,
        }
    }

    /// HTTP status returned to Journey Builder for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ActivityError::ConfigurationMissing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ActivityError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ActivityError::InvalidRequest { .. }
            | ActivityError::MissingLocation { .. }
            | ActivityError::Unresolvable { .. }
            | ActivityError::GeocodeFailed { .. } => StatusCode::BAD_REQUEST,
            ActivityError::Provider { status: Some(_), .. } => StatusCode::BAD_REQUEST,
            ActivityError::Provider { status: None, .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ActivityError::ConfigurationMissing { .. } => {
                "Weather activity is not configured. Please check the API key and signing secret."
                    .to_string()
            }
            ActivityError::AuthenticationFailed { .. } => {
                "Request could not be authenticated.".to_string()
            }
            ActivityError::Provider { status: None, .. } => {
                "Unable to reach the weather service.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Fail-open body: the contact always gets a branch, even on error.
impl IntoResponse for ActivityError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "error": self.user_message(),
            "branchResult": BranchResult::GoodWeather,
        });
        match &self {
            ActivityError::MissingLocation { received } => body["received"] = json!(received),
            ActivityError::Provider {
                response: Some(response),
                ..
            } => body["weatherApiResponse"] = json!(response),
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = ActivityError::configuration("missing API key");
        assert!(matches!(config_err, ActivityError::ConfigurationMissing { .. }));

        let auth_err = ActivityError::authentication("bad signature");
        assert!(matches!(auth_err, ActivityError::AuthenticationFailed { .. }));

        let geo_err = ActivityError::geocode("no results");
        assert!(matches!(geo_err, ActivityError::GeocodeFailed { .. }));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ActivityError::configuration("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ActivityError::authentication("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ActivityError::missing_location(ReceivedLocation::default()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ActivityError::unresolvable("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ActivityError::provider_status(404, "city not found").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ActivityError::provider("connection reset").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    async fn response_body(err: ActivityError) -> (StatusCode, Value) {
        use http_body_util::BodyExt;

        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_fail_open_body_hides_token_details() {
        let (status, body) =
            response_body(ActivityError::authentication("InvalidSignature at byte 42")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["branchResult"], "Good Weather");
        assert_eq!(body["error"], "Request could not be authenticated.");
    }

    #[tokio::test]
    async fn test_fail_open_body_echoes_provider_response() {
        let err = ActivityError::provider_status(404, "city not found")
            .with_response(json!({"cod": "404", "message": "city not found"}));
        let (status, body) = response_body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["weatherApiResponse"]["cod"], "404");
        assert!(body["error"].as_str().unwrap().contains("city not found"));

        let (_, body) = response_body(ActivityError::provider("connection reset")).await;
        assert!(body.get("weatherApiResponse").is_none());
    }

    #[test]
    fn test_with_response_ignores_other_errors() {
        let err = ActivityError::geocode("x").with_response(json!({}));
        assert!(matches!(err, ActivityError::GeocodeFailed { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = ActivityError::configuration("test");
        assert!(config_err.user_message().contains("not configured"));

        let geo_err = ActivityError::geocode("no match for 99999");
        assert!(geo_err.user_message().contains("99999"));
    }
}
