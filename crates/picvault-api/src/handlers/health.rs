//! Health check handler.

use axum::Json;
use axum::extract::State;

use picvault_core::traits::media::MediaStore;

use crate::dto::response::{ApiResponse, BackendHealth, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// Always answers 200 while the process is up; backend failures only
/// downgrade `status`.
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let repository = state.store.repository();
    let database = BackendHealth {
        provider: repository.provider_type().to_string(),
        healthy: backend_healthy(state.node_service.health_check().await, "database"),
    };
    let storage = BackendHealth {
        provider: state.media.provider_type().to_string(),
        healthy: backend_healthy(state.media.health_check().await, "storage"),
    };

    let status = if database.healthy && storage.healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        storage,
    }))
}

fn backend_healthy(result: picvault_core::AppResult<bool>, backend: &str) -> bool {
    match result {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!(backend, error = %e, "Backend health check failed");
            false
        }
    }
}
