//! Identity endpoint.

use axum::Json;

use picvault_auth::UserProfile;

use crate::dto::response::ApiResponse;
use crate::extractors::AuthUser;

/// GET /api/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<UserProfile>> {
    Json(ApiResponse::ok(auth.profile()))
}
