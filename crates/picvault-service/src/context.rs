//! Request context carrying the authenticated owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use picvault_auth::Claims;

/// Context for the current authenticated request.
///
/// Built by the API layer from verified token claims and passed into every
/// service method, so each operation knows *whose* tree it touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Identity-provider subject; scopes every query.
    pub owner_id: String,
    /// Display name from the token, if present.
    pub display_name: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for `owner_id`.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            display_name: None,
            request_time: Utc::now(),
        }
    }

    /// Creates a context from verified token claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            owner_id: claims.sub.clone(),
            display_name: claims.name.clone(),
            request_time: Utc::now(),
        }
    }
}
