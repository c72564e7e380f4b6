//! Local filesystem media store.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::{debug, warn};

use picvault_core::config::StorageConfig;
use picvault_core::error::{AppError, ErrorKind};
use picvault_core::result::AppResult;
use picvault_core::traits::media::{MediaStore, StoredAsset};

use crate::thumbnail::ThumbnailGenerator;

/// Preview location relative to the asset's directory. Sanitized asset
/// names never start with a dot, so the two cannot collide.
const THUMBNAIL_DIR: &str = ".thumb";
const THUMBNAIL_FILE: &str = "preview.jpg";

/// Media store writing assets below a root directory.
///
/// Assets are served back by the HTTP layer under `public_base_url`, so a
/// key `owner/uuid/cat.jpg` becomes `{public_base_url}/owner/uuid/cat.jpg`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    /// Root directory for all stored assets.
    root: PathBuf,
    /// URL prefix the root directory is served under.
    public_base_url: String,
    /// Preview renderer; `None` disables thumbnails.
    thumbnails: Option<ThumbnailGenerator>,
}

impl LocalMediaStore {
    /// Create a store rooted at `root_path`, creating the directory if needed.
    pub async fn new(
        root_path: impl Into<PathBuf>,
        public_base_url: &str,
        thumbnails: Option<ThumbnailGenerator>,
    ) -> AppResult<Self> {
        let root = root_path.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create media root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            thumbnails,
        })
    }

    /// Create a store from the `storage` configuration section.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        Self::new(
            &config.local.root_path,
            &config.public_base_url,
            ThumbnailGenerator::from_config(&config.thumbnail),
        )
        .await
    }

    /// The root directory assets are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path within the root, rejecting escapes.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::invalid_argument(format!("Invalid asset key: {key}")));
        }
        Ok(self.root.join(relative))
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }

    fn thumbnail_key(key: &str) -> String {
        match key.rfind('/') {
            Some(i) => format!("{}/{THUMBNAIL_DIR}/{THUMBNAIL_FILE}", &key[..i]),
            None => format!("{THUMBNAIL_DIR}/{THUMBNAIL_FILE}"),
        }
    }

    async fn write(&self, key: &str, data: &[u8]) -> AppResult<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        fs::write(&path, data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write asset: {key}"), e)
        })?;
        debug!(key, bytes = data.len(), "Wrote asset");
        Ok(())
    }

    async fn remove_if_exists(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete asset: {key}"),
                e,
            )),
        }
    }

    /// Render and write a preview, returning its URL. Preview failures are
    /// not upload failures.
    async fn store_thumbnail(&self, key: &str, data: Bytes, content_type: &str) -> Option<String> {
        let generator = self.thumbnails.as_ref()?;
        if !ThumbnailGenerator::is_supported(content_type) {
            return None;
        }
        let thumb_key = Self::thumbnail_key(key);
        let result = match generator.generate(data).await {
            Ok(bytes) => self.write(&thumb_key, &bytes).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => Some(self.url_for(&thumb_key)),
            Err(e) => {
                warn!(key, error = %e, "Thumbnail generation failed; storing without preview");
                None
            }
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn store(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<StoredAsset> {
        self.write(key, &data).await?;
        let thumbnail_url = self.store_thumbnail(key, data, content_type).await;

        Ok(StoredAsset {
            storage_key: key.to_string(),
            storage_url: self.url_for(key),
            thumbnail_url,
        })
    }

    async fn release(&self, storage_key: &str) -> AppResult<()> {
        self.remove_if_exists(storage_key).await?;
        let thumb_key = Self::thumbnail_key(storage_key);
        self.remove_if_exists(&thumb_key).await?;

        // The per-upload directories are empty now; a failure here only
        // leaves an empty directory behind.
        if let Some(thumb_dir) = self.resolve(&thumb_key)?.parent() {
            let _ = fs::remove_dir(thumb_dir).await;
        }
        if let Some(dir) = self.resolve(storage_key)?.parent() {
            if dir != self.root {
                let _ = fs::remove_dir(dir).await;
            }
        }
        debug!(key = storage_key, "Released asset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thumbnail::generator::tests::png_bytes;

    async fn store_in(dir: &tempfile::TempDir, thumbnails: bool) -> LocalMediaStore {
        LocalMediaStore::new(
            dir.path(),
            "http://localhost:8080/media/",
            thumbnails.then(|| ThumbnailGenerator::new(32)),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_store_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, true).await;

        let asset = store
            .store("user-1/abc/cat.png", png_bytes(100, 50), "image/png")
            .await
            .unwrap();

        assert_eq!(asset.storage_key, "user-1/abc/cat.png");
        assert_eq!(asset.storage_url, "http://localhost:8080/media/user-1/abc/cat.png");
        assert_eq!(
            asset.thumbnail_url.as_deref(),
            Some("http://localhost:8080/media/user-1/abc/.thumb/preview.jpg")
        );
        assert!(dir.path().join("user-1/abc/cat.png").exists());
        assert!(dir.path().join("user-1/abc/.thumb/preview.jpg").exists());

        store.release(&asset.storage_key).await.unwrap();
        assert!(!dir.path().join("user-1/abc").exists());
    }

    #[tokio::test]
    async fn test_preview_never_overwrites_asset() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, true).await;
        let original = png_bytes(200, 200);

        let asset = store
            .store("alice/u1/thumbnail.jpg", original.clone(), "image/png")
            .await
            .unwrap();
        let on_disk = std::fs::read(dir.path().join("alice/u1/thumbnail.jpg")).unwrap();
        assert_eq!(on_disk, original.to_vec());
        assert_ne!(asset.thumbnail_url.as_deref(), Some(asset.storage_url.as_str()));

        let asset = store
            .store("alice/u2/preview.jpg", original.clone(), "image/png")
            .await
            .unwrap();
        let on_disk = std::fs::read(dir.path().join("alice/u2/preview.jpg")).unwrap();
        assert_eq!(on_disk, original.to_vec());

        store.release(&asset.storage_key).await.unwrap();
        assert!(!dir.path().join("alice/u2").exists());
    }

    #[tokio::test]
    async fn test_undecodable_image_is_stored_without_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, true).await;

        let asset = store
            .store("u/1/broken.png", Bytes::from_static(b"garbage"), "image/png")
            .await
            .unwrap();
        assert!(asset.thumbnail_url.is_none());
        assert!(dir.path().join("u/1/broken.png").exists());
    }

    #[tokio::test]
    async fn test_release_unknown_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, false).await;
        store.release("nobody/none/missing.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, false).await;
        let err = store
            .store("../outside.jpg", Bytes::from_static(b"x"), "image/jpeg")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(store.health_check().await.unwrap());
    }
}
