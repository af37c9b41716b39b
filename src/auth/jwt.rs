//! Signed-token handling for activity requests
//!
//! With `useJwt` Journey Builder signs the activity payload with the
//! package's HMAC secret. The token arrives in the `x-jwt-assertion` header,
//! or as the whole request body.

use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::ActivityError;
use crate::models::ActivityPayload;

/// Header carrying the signed payload
pub const JWT_HEADER: &str = "x-jwt-assertion";

/// HS256 verifier for one signing secret
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Journey Builder tokens carry no aud and not always an exp
        validation.required_spec_claims.clear();
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Check the signature (and `exp`, if present) and decode the claims
    pub fn verify(&self, token: &str) -> Result<ActivityPayload, ActivityError> {
        decode::<ActivityPayload>(token.trim(), &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("JWT verification failed: {}", e);
                ActivityError::authentication(format!("Invalid token: {e}"))
            })
    }
}

/// Read the activity payload from a request, verifying the token when the
/// deployment requires it.
///
/// # Errors
///
/// - [`ActivityError::ConfigurationMissing`] when verification is on but no
///   secret is configured
/// - [`ActivityError::AuthenticationFailed`] for a missing or invalid token
/// - [`ActivityError::InvalidRequest`] for an unparseable JSON body
pub fn extract_payload(
    headers: &HeaderMap,
    body: &[u8],
    auth: &AuthConfig,
) -> Result<ActivityPayload, ActivityError> {
    if !auth.verify_jwt {
        return parse_json_body(body);
    }

    let secret = auth.jwt_secret.as_deref().ok_or_else(|| {
        ActivityError::configuration(
            "JWT verification is enabled but no signing secret is configured",
        )
    })?;

    let token = match headers.get(JWT_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| ActivityError::authentication("Token header is not valid text"))?
            .to_string(),
        None => body_token(body)
            .ok_or_else(|| ActivityError::authentication("Missing signed token"))?,
    };

    debug!("Verifying signed activity payload");
    JwtVerifier::new(secret).verify(&token)
}

/// A body that is itself a compact JWT (three base64url segments)
fn body_token(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?.trim();
    let segments: Vec<&str> = text.split('.').collect();
    let is_compact = segments.len() == 3
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        });
    is_compact.then(|| text.to_string())
}

fn parse_json_body(body: &[u8]) -> Result<ActivityPayload, ActivityError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ActivityError::invalid_request("Request body is empty"));
    }
    serde_json::from_slice(body)
        .map_err(|e| ActivityError::invalid_request(format!("Malformed JSON body: {e}")))
}
