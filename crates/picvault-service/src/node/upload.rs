//! Two-step upload: asset to the media store, then the metadata row.
//!
//! The two steps are not atomic. When the row insert fails after the asset
//! was stored, one best-effort release is attempted; if that fails too the
//! asset is orphaned and logged as such.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use picvault_core::config::StorageConfig;
use picvault_core::error::{AppError, ErrorKind};
use picvault_core::result::AppResult;
use picvault_core::traits::media::MediaStore;
use picvault_core::types::NodeId;
use picvault_entity::node::{Node, normalize_name};
use picvault_storage::asset_key;

use crate::context::RequestContext;
use crate::node::service::{NewFile, NodeService};

/// Content type browsers send when they do not know better.
const GENERIC_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload parameters (single request with the full file body).
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type; guessed from the extension when absent or generic.
    pub content_type: Option<String>,
    /// File body.
    pub data: Bytes,
    /// Target folder; `None` for the root level.
    pub parent_id: Option<NodeId>,
    /// Owner id the client claims to act for, if it sent one.
    pub claimed_owner: Option<String>,
}

/// Handles file uploads.
#[derive(Clone)]
pub struct UploadService {
    /// Node service recording the metadata.
    nodes: NodeService,
    /// Media store receiving the bytes.
    media: Arc<dyn MediaStore>,
    /// Upload limits.
    config: StorageConfig,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("media", &self.media.provider_type())
            .field("max_upload_size_bytes", &self.config.max_upload_size_bytes)
            .finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(nodes: NodeService, media: Arc<dyn MediaStore>) -> Self {
        let config = nodes.storage_config().clone();
        Self {
            nodes,
            media,
            config,
        }
    }

    /// Validates, stores, and records an uploaded file.
    pub async fn upload(&self, ctx: &RequestContext, params: UploadParams) -> AppResult<Node> {
        if let Some(claimed) = params.claimed_owner.as_deref().map(str::trim) {
            if !claimed.is_empty() && claimed != ctx.owner_id {
                return Err(AppError::authentication(
                    "Upload owner does not match the authenticated user",
                ));
            }
        }

        let size = params.data.len() as u64;
        if size > self.config.max_upload_size_bytes {
            return Err(AppError::invalid_argument(format!(
                "File size {size} exceeds the maximum of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        if size == 0 {
            return Err(AppError::invalid_argument("File is empty"));
        }

        let name = normalize_name(&params.file_name)?;
        let content_type = resolve_content_type(params.content_type.as_deref(), &name);
        if !self.config.accepts(&content_type) {
            return Err(AppError::invalid_argument(format!(
                "Content type '{content_type}' is not accepted"
            )));
        }

        self.nodes.validate_parent(ctx, params.parent_id).await?;

        let key = asset_key(&ctx.owner_id, &name);
        debug!(owner_id = %ctx.owner_id, key = %key, size, "Storing asset");
        let asset = self
            .media
            .store(&key, params.data, &content_type)
            .await
            .map_err(|e| {
                error!(owner_id = %ctx.owner_id, key = %key, error = %e, "Media store failed");
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Media store rejected the upload",
                    e,
                )
            })?;

        let created = self
            .nodes
            .create_file(
                ctx,
                NewFile {
                    name,
                    size_bytes: size,
                    content_type,
                    storage_url: asset.storage_url,
                    thumbnail_url: asset.thumbnail_url,
                    storage_key: Some(asset.storage_key.clone()),
                    parent_id: params.parent_id,
                },
            )
            .await;

        match created {
            Ok(node) => {
                info!(
                    owner_id = %ctx.owner_id,
                    node_id = %node.id,
                    size,
                    "Upload completed"
                );
                Ok(node)
            }
            Err(e) => {
                if let Err(release_err) = self.media.release(&asset.storage_key).await {
                    warn!(
                        owner_id = %ctx.owner_id,
                        storage_key = %asset.storage_key,
                        error = %release_err,
                        "Orphaned asset: metadata insert failed and release failed"
                    );
                }
                Err(e)
            }
        }
    }
}

/// Picks the declared content type, falling back to the extension.
fn resolve_content_type(declared: Option<&str>, file_name: &str) -> String {
    let declared = declared
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != GENERIC_CONTENT_TYPE);

    declared.unwrap_or_else(|| {
        mime_guess::from_path(file_name)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| GENERIC_CONTENT_TYPE.to_string())
    })
}
