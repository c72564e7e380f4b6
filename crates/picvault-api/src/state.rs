//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use picvault_auth::JwtDecoder;
use picvault_core::config::AppConfig;
use picvault_core::traits::media::MediaStore;
use picvault_database::NodeStore;
use picvault_storage::MediaManager;
use picvault_service::{NodeService, UploadService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Node store (Postgres or in-memory)
    pub store: Arc<NodeStore>,
    /// Media provider manager
    pub media: Arc<MediaManager>,
    /// Bearer token validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Tree operations
    pub node_service: Arc<NodeService>,
    /// Two-step uploads
    pub upload_service: Arc<UploadService>,
}

impl AppState {
    /// Wires services on top of an already-connected store and media manager.
    pub fn new(config: AppConfig, store: NodeStore, media: MediaManager) -> Self {
        let media = Arc::new(media);
        let media_store: Arc<dyn MediaStore> = media.clone();

        let node_service = NodeService::new(
            store.repository(),
            Arc::clone(&media_store),
            config.storage.clone(),
        );
        let upload_service = UploadService::new(node_service.clone(), media_store);
        let jwt_decoder = JwtDecoder::new(&config.auth);

        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            media,
            jwt_decoder: Arc::new(jwt_decoder),
            node_service: Arc::new(node_service),
            upload_service: Arc::new(upload_service),
        }
    }
}
