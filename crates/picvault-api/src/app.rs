//! Application builder: wires stores, services, and the router into a server.

use std::time::Duration;

use axum::Router;

use picvault_core::config::AppConfig;
use picvault_core::error::{AppError, ErrorKind};
use picvault_database::NodeStore;
use picvault_storage::MediaManager;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Connects backends from `config` and serves HTTP until `shutdown` resolves.
pub async fn run_server<F>(config: AppConfig, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!(
        database = %config.database.provider,
        storage = %config.storage.provider,
        "Initializing backends"
    );

    let store = NodeStore::connect(&config.database).await?;
    let media = MediaManager::new(&config.storage).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(config, store, media);
    let store = state.store.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;

    tracing::info!("PicVault server listening on {}", addr);

    // In-flight requests get `shutdown_grace_seconds` after the signal.
    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown.await;
        tracing::info!("Shutdown signal received, draining in-flight requests...");
        let _ = signal_tx.send(());
    });

    let mut serve = tokio::spawn(async move { server.await });
    let outcome = tokio::select! {
        result = &mut serve => result,
        _ = async {
            match signal_rx.await {
                Ok(()) => tokio::time::sleep(grace).await,
                Err(_) => std::future::pending::<()>().await,
            }
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
            serve.abort();
            Ok(Ok(()))
        }
    };

    store.close().await;
    tracing::info!("PicVault server stopped");

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::with_source(ErrorKind::Internal, "Server error", e)),
        Err(e) => Err(AppError::with_source(ErrorKind::Internal, "Server task failed", e)),
    }
}
