//! Session tokens: issuing them at login and turning them back into an owner.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::{OwnerId, User};
use crate::error::AppError;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies HS256 session tokens.
///
/// Stateless: a token stays valid until `exp`, logout only drops the client's copy.
pub struct SessionGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_hours: i64,
}

impl SessionGate {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_hours,
        }
    }

    /// Session lifetime, also used for the cookie `Max-Age`.
    pub fn ttl(&self) -> Duration {
        Duration::hours(self.ttl_hours)
    }

    /// Issues a session token for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl()).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AppError::internal(
                "Failed to issue session",
                json!({ "reason": e.to_string() }),
            )
        })
    }

    /// Verifies a session token and returns the owner it was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is malformed, has a bad
    /// signature, is expired, or names no valid user id.
    pub fn authorize(&self, token: &str) -> Result<OwnerId, AppError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Session token rejected: {}", e);
                AppError::unauthorized("Unauthorized", json!({ "reason": "Invalid or expired session" }))
            })?;

        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| {
            AppError::unauthorized("Unauthorized", json!({ "reason": "Invalid session subject" }))
        })?;

        Ok(OwnerId::new(id))
    }
}
