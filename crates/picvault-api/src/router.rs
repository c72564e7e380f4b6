//! Route definitions for the PicVault HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Room for multipart boundaries and the text fields around the file part.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.storage.max_upload_size_bytes as usize + MULTIPART_OVERHEAD_BYTES;

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(identity_routes())
        .merge(upload_routes())
        .merge(folder_routes())
        .merge(node_routes());

    let mut router = Router::new().nest("/api", api_routes);

    // Local assets are served back under the public base URL's path.
    if state.config.storage.provider == "local" {
        router = router.nest_service(
            "/media",
            ServeDir::new(&state.config.storage.local.root_path),
        );
    }

    let cors = build_cors_layer(&state.config.server.cors);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Identity profile from the bearer token
fn identity_routes() -> Router<AppState> {
    Router::new().route("/me", get(handlers::auth::me))
}

fn upload_routes() -> Router<AppState> {
    Router::new().route("/files/upload", post(handlers::file::upload_file))
}

fn folder_routes() -> Router<AppState> {
    Router::new().route("/folders/create", post(handlers::folder::create_folder))
}

/// Listing, lookup, star, trash, move, rename, delete
fn node_routes() -> Router<AppState> {
    Router::new()
        .route("/nodes", get(handlers::node::list_nodes))
        .route("/nodes/starred", get(handlers::node::list_starred))
        .route(
            "/nodes/trash",
            get(handlers::node::list_trash).delete(handlers::node::empty_trash),
        )
        .route(
            "/nodes/{id}",
            get(handlers::node::get_node).delete(handlers::node::delete_node),
        )
        .route("/nodes/{id}/ancestors", get(handlers::node::ancestors))
        .route("/nodes/{id}/star", patch(handlers::node::toggle_star))
        .route("/nodes/{id}/trash", patch(handlers::node::move_to_trash))
        .route("/nodes/{id}/restore", patch(handlers::node::restore))
        .route("/nodes/{id}/move", patch(handlers::node::move_node))
        .route("/nodes/{id}/rename", patch(handlers::node::rename))
}
