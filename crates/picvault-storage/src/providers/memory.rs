//! In-memory media store with fault injection, for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use picvault_core::error::AppError;
use picvault_core::result::AppResult;
use picvault_core::traits::media::{MediaStore, StoredAsset};

/// Media store holding assets in a map.
#[derive(Debug)]
pub struct MemoryMediaStore {
    assets: RwLock<HashMap<String, (Bytes, String)>>,
    base_url: String,
    fail_store: AtomicBool,
    fail_release: AtomicBool,
    release_calls: AtomicUsize,
}

impl MemoryMediaStore {
    /// Create an empty store producing URLs under `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            assets: RwLock::new(HashMap::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            fail_store: AtomicBool::new(false),
            fail_release: AtomicBool::new(false),
            release_calls: AtomicUsize::new(0),
        }
    }

    /// Make subsequent `store` calls fail.
    pub fn set_fail_store(&self, fail: bool) {
        self.fail_store.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `release` calls fail.
    pub fn set_fail_release(&self, fail: bool) {
        self.fail_release.store(fail, Ordering::SeqCst);
    }

    /// Whether an asset is currently held under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.assets.read().await.contains_key(key)
    }

    /// Number of held assets.
    pub async fn len(&self) -> usize {
        self.assets.read().await.len()
    }

    /// Whether the store holds no assets.
    pub async fn is_empty(&self) -> bool {
        self.assets.read().await.is_empty()
    }

    /// Number of `release` calls seen, including failed ones.
    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }
}

impl Default for MemoryMediaStore {
    fn default() -> Self {
        Self::new("memory://media")
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.fail_store.load(Ordering::SeqCst))
    }

    async fn store(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<StoredAsset> {
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(AppError::storage("Injected store failure"));
        }
        self.assets
            .write()
            .await
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(StoredAsset {
            storage_key: key.to_string(),
            storage_url: format!("{}/{key}", self.base_url),
            thumbnail_url: content_type
                .starts_with("image/")
                .then(|| format!("{}/{key}?thumbnail", self.base_url)),
        })
    }

    async fn release(&self, storage_key: &str) -> AppResult<()> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(AppError::storage("Injected release failure"));
        }
        self.assets.write().await.remove(storage_key);
        Ok(())
    }
}
