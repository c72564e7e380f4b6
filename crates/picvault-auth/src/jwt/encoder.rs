//! Token minting for development and tests.
//!
//! Production tokens come from the identity provider; this encoder signs
//! tokens with the same shared secret so a local deployment can be
//! exercised without one.

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use picvault_core::config::AuthConfig;
use picvault_core::error::AppError;

use super::claims::Claims;

/// Creates signed HS256 tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    issuer: Option<String>,
    audience: Option<String>,
    /// Default token TTL in minutes.
    ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl_minutes: config.dev_token_ttl_minutes,
        }
    }

    /// Issues a token for `subject` with the configured TTL.
    pub fn issue(&self, subject: &str, name: Option<&str>) -> Result<String, AppError> {
        self.issue_with_ttl(subject, name, Duration::minutes(self.ttl_minutes))
    }

    /// Issues a token for `subject` expiring after `ttl`.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        name: Option<&str>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        if subject.trim().is_empty() {
            return Err(AppError::invalid_argument("Token subject cannot be empty"));
        }
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + ttl).timestamp(),
            iat: Some(now.timestamp()),
            iss: self.issuer.clone(),
            aud: self.audience.clone().map(serde_json::Value::String),
            name: name.map(str::to_string),
            email: None,
            picture: None,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }
}
