//! # picvault-api
//!
//! HTTP API layer for PicVault built on Axum.
//!
//! Provides the REST endpoints over the node tree, the upload endpoint,
//! middleware (CORS, logging), the bearer-token extractor, DTOs, and the
//! mapping from `AppError` to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
