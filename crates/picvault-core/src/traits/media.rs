//! Media store trait for the external asset service.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Where an uploaded asset ended up.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredAsset {
    /// Opaque reference handed back to [`MediaStore::release`].
    pub storage_key: String,
    /// Durable URL of the original asset.
    pub storage_url: String,
    /// URL of a preview rendition, if the provider produced one.
    pub thumbnail_url: Option<String>,
}

/// Trait for binary asset backends.
///
/// The node store never inspects file bytes; it only records the
/// [`StoredAsset`] returned here and asks for its release on permanent
/// deletion. Implementations live in `picvault-storage`.
#[async_trait]
pub trait MediaStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store an asset under `key` and return its location.
    async fn store(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<StoredAsset>;

    /// Release a previously stored asset. Releasing an unknown key is not an error.
    async fn release(&self, storage_key: &str) -> AppResult<()>;
}
