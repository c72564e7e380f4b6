//! Media storage configuration.

use serde::{Deserialize, Serialize};

/// Top-level media storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Media provider: `"local"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Maximum upload size in bytes (default 5 MiB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Accepted content type prefixes, e.g. `"image/"`.
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
    /// Base URL under which stored assets are reachable.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Local filesystem provider settings.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// Thumbnail generation settings.
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_upload_size_bytes: default_max_upload(),
            allowed_content_types: default_allowed_content_types(),
            public_base_url: default_public_base_url(),
            local: LocalStorageConfig::default(),
            thumbnail: ThumbnailConfig::default(),
        }
    }
}

impl StorageConfig {
    /// Whether a content type is accepted for upload.
    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.to_ascii_lowercase();
        self.allowed_content_types
            .iter()
            .any(|prefix| content_type.starts_with(&prefix.to_ascii_lowercase()))
    }
}

/// Local filesystem provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root directory for stored assets.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

/// Preview generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Whether thumbnails are generated on upload.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Longest edge of a generated thumbnail, in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub max_dimension: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_dimension: default_thumbnail_size(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_max_upload() -> u64 {
    5_242_880 // 5 MiB
}

fn default_allowed_content_types() -> Vec<String> {
    vec!["image/".to_string()]
}

fn default_public_base_url() -> String {
    "http://localhost:8080/media".to_string()
}

fn default_local_root() -> String {
    "./data/media".to_string()
}

fn default_true() -> bool {
    true
}

fn default_thumbnail_size() -> u32 {
    256
}
