//! Media manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use picvault_core::config::StorageConfig;
use picvault_core::error::AppError;
use picvault_core::result::AppResult;
use picvault_core::traits::media::{MediaStore, StoredAsset};

use crate::providers::MemoryMediaStore;

/// Longest sanitized file-name component kept in an asset key.
const MAX_KEY_NAME_LENGTH: usize = 128;

/// Media manager wrapping the provider selected at construction time.
#[derive(Debug, Clone)]
pub struct MediaManager {
    inner: Arc<dyn MediaStore>,
}

impl MediaManager {
    /// Create a media manager from the `storage` configuration section.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let inner: Arc<dyn MediaStore> = match config.provider.as_str() {
            #[cfg(feature = "local")]
            "local" => {
                info!(root = %config.local.root_path, "Initializing local media store");
                Arc::new(crate::providers::LocalMediaStore::from_config(config).await?)
            }
            "memory" => {
                info!("Initializing in-memory media store");
                Arc::new(MemoryMediaStore::new(&config.public_base_url))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'. Supported: local, memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a media manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn MediaStore>) -> Self {
        Self { inner: provider }
    }

    /// Get a reference to the inner provider.
    pub fn provider(&self) -> &dyn MediaStore {
        self.inner.as_ref()
    }
}

#[async_trait]
impl MediaStore for MediaManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn store(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<StoredAsset> {
        self.inner.store(key, data, content_type).await
    }

    async fn release(&self, storage_key: &str) -> AppResult<()> {
        self.inner.release(storage_key).await
    }
}

/// Reduce an uploaded file name to characters safe in keys and URLs.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_KEY_NAME_LENGTH)
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Build a fresh asset key: `{owner}/{uuid}/{sanitized file name}`.
pub fn asset_key(owner_id: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        sanitize_file_name(owner_id),
        Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}
