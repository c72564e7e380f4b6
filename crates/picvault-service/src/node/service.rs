//! File and folder tree operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use picvault_core::config::StorageConfig;
use picvault_core::error::{AppError, ErrorKind};
use picvault_core::result::AppResult;
use picvault_core::traits::media::MediaStore;
use picvault_core::types::NodeId;
use picvault_database::NodeRepository;
use picvault_entity::node::{ListFilter, NewNode, Node, normalize_name};

use crate::context::RequestContext;

/// Metadata of an already-stored asset to record as a file node.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// File name; trimmed and validated like folder names.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type.
    pub content_type: String,
    /// Location returned by the media store.
    pub storage_url: String,
    /// Preview location, if the media store produced one.
    pub thumbnail_url: Option<String>,
    /// Media store reference used for release.
    pub storage_key: Option<String>,
    /// Containing folder; `None` for the root level.
    pub parent_id: Option<NodeId>,
}

/// An asset that could not be released after its row was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseFailure {
    pub node_id: NodeId,
    pub storage_key: String,
    pub message: String,
}

/// Result of a permanent deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    /// Every removed node id, children before parents.
    pub deleted: Vec<NodeId>,
    /// Number of assets released from the media store.
    pub released_assets: usize,
    /// Assets left behind in the media store.
    pub release_failures: Vec<ReleaseFailure>,
}

impl DeleteOutcome {
    fn merge(&mut self, other: DeleteOutcome) {
        self.deleted.extend(other.deleted);
        self.released_assets += other.released_assets;
        self.release_failures.extend(other.release_failures);
    }
}

/// Implements every operation on a user's file/folder tree.
#[derive(Debug, Clone)]
pub struct NodeService {
    /// Node repository.
    repo: Arc<dyn NodeRepository>,
    /// Media store, used to release assets on permanent deletion.
    media: Arc<dyn MediaStore>,
    /// Upload limits.
    config: StorageConfig,
}

impl NodeService {
    /// Creates a new node service.
    pub fn new(
        repo: Arc<dyn NodeRepository>,
        media: Arc<dyn MediaStore>,
        config: StorageConfig,
    ) -> Self {
        Self {
            repo,
            media,
            config,
        }
    }

    /// The storage configuration this service enforces.
    pub fn storage_config(&self) -> &StorageConfig {
        &self.config
    }

    /// Whether the metadata store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.repo.health_check().await
    }

    /// Gets a node owned by the caller.
    pub async fn get_node(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Node> {
        self.repo
            .find_by_id(&ctx.owner_id, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    /// Checks that `parent_id` names a live folder of the caller.
    ///
    /// Missing or foreign parents are `NotFound`, files are
    /// `InvalidArgument`, and trashed folders are `InvalidOperation`.
    pub async fn validate_parent(
        &self,
        ctx: &RequestContext,
        parent_id: Option<NodeId>,
    ) -> AppResult<Option<Node>> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        let parent = self
            .repo
            .find_by_id(&ctx.owner_id, parent_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Parent folder {parent_id} not found")))?;
        if !parent.is_folder {
            return Err(AppError::invalid_argument(format!(
                "Parent {parent_id} is not a folder"
            )));
        }
        if parent.is_trashed {
            return Err(AppError::invalid_operation(format!(
                "Parent folder {parent_id} is in the trash"
            )));
        }
        Ok(Some(parent))
    }

    /// Records a stored asset as a file node.
    pub async fn create_file(&self, ctx: &RequestContext, file: NewFile) -> AppResult<Node> {
        let name = normalize_name(&file.name)?;
        if file.size_bytes > self.config.max_upload_size_bytes {
            return Err(AppError::invalid_argument(format!(
                "File size {} exceeds the maximum of {} bytes",
                file.size_bytes, self.config.max_upload_size_bytes
            )));
        }
        if file.content_type.trim().is_empty() {
            return Err(AppError::invalid_argument("Content type is required"));
        }
        if file.storage_url.trim().is_empty() {
            return Err(AppError::invalid_argument("Storage URL is required"));
        }
        let size_bytes = i64::try_from(file.size_bytes)
            .map_err(|_| AppError::invalid_argument("File size out of range"))?;

        let node = self
            .repo
            .insert(NewNode {
                owner_id: ctx.owner_id.clone(),
                parent_id: file.parent_id,
                name,
                size_bytes,
                content_type: file.content_type,
                storage_url: Some(file.storage_url),
                thumbnail_url: file.thumbnail_url,
                storage_key: file.storage_key,
                is_folder: false,
            })
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            node_id = %node.id,
            path = %node.path,
            size = node.size_bytes,
            "File created"
        );
        Ok(node)
    }

    /// Creates a folder.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<NodeId>,
    ) -> AppResult<Node> {
        let name = normalize_name(name)?;
        let folder = self
            .repo
            .insert(NewNode::folder(ctx.owner_id.clone(), parent_id, name))
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            node_id = %folder.id,
            path = %folder.path,
            "Folder created"
        );
        Ok(folder)
    }

    /// Lists the immediate children of a folder, or of the root level.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        parent_id: Option<NodeId>,
        filter: ListFilter,
    ) -> AppResult<Vec<Node>> {
        if let Some(parent_id) = parent_id {
            let parent = self.repo.find_by_id(&ctx.owner_id, parent_id).await?;
            if !parent.is_some_and(|p| p.is_folder) {
                return Err(AppError::not_found(format!("Folder {parent_id} not found")));
            }
        }
        self.repo.list_children(&ctx.owner_id, parent_id, filter).await
    }

    /// Every starred, non-trashed node of the caller.
    pub async fn list_starred(&self, ctx: &RequestContext) -> AppResult<Vec<Node>> {
        self.repo.list_starred(&ctx.owner_id).await
    }

    /// Top-level trashed items: nodes in the trash whose parent is not.
    pub async fn list_trash(&self, ctx: &RequestContext) -> AppResult<Vec<Node>> {
        self.repo.list_trash_roots(&ctx.owner_id).await
    }

    /// Breadcrumb chain from the root level down to `id`.
    pub async fn ancestors(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Vec<Node>> {
        self.repo.ancestors(&ctx.owner_id, id).await
    }

    /// Flips the starred flag.
    pub async fn toggle_star(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Node> {
        let node = self.repo.toggle_star(&ctx.owner_id, id).await?;
        info!(
            owner_id = %ctx.owner_id,
            node_id = %id,
            starred = node.is_starred,
            "Star toggled"
        );
        Ok(node)
    }

    /// Moves a node and its whole subtree to the trash.
    pub async fn move_to_trash(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Node> {
        let node = self.repo.set_trashed(&ctx.owner_id, id, true).await?;
        info!(owner_id = %ctx.owner_id, node_id = %id, "Moved to trash");
        Ok(node)
    }

    /// Restores a node and its whole subtree from the trash.
    pub async fn restore_from_trash(&self, ctx: &RequestContext, id: NodeId) -> AppResult<Node> {
        let node = self.repo.set_trashed(&ctx.owner_id, id, false).await?;
        info!(owner_id = %ctx.owner_id, node_id = %id, "Restored from trash");
        Ok(node)
    }

    /// Moves a node under `new_parent_id` (or to the root level).
    pub async fn move_node(
        &self,
        ctx: &RequestContext,
        id: NodeId,
        new_parent_id: Option<NodeId>,
    ) -> AppResult<Node> {
        let node = self.repo.move_node(&ctx.owner_id, id, new_parent_id).await?;
        info!(
            owner_id = %ctx.owner_id,
            node_id = %id,
            path = %node.path,
            "Node moved"
        );
        Ok(node)
    }

    /// Renames a node, rewriting descendant paths.
    pub async fn rename_node(&self, ctx: &RequestContext, id: NodeId, name: &str) -> AppResult<Node> {
        let name = normalize_name(name)?;
        let node = self.repo.rename(&ctx.owner_id, id, &name).await?;
        info!(
            owner_id = %ctx.owner_id,
            node_id = %id,
            path = %node.path,
            "Node renamed"
        );
        Ok(node)
    }

    /// Permanently deletes a trashed node and its subtree, then releases
    /// the external assets of every removed file.
    ///
    /// Release failures do not undo the deletion; they are reported in
    /// [`DeleteOutcome::release_failures`].
    pub async fn permanently_delete(
        &self,
        ctx: &RequestContext,
        id: NodeId,
    ) -> AppResult<DeleteOutcome> {
        let removed = self.repo.delete_subtree(&ctx.owner_id, id).await?;
        info!(
            owner_id = %ctx.owner_id,
            node_id = %id,
            count = removed.len(),
            "Nodes permanently deleted"
        );
        Ok(self.release_assets(removed).await)
    }

    /// Permanently deletes everything in the caller's trash.
    pub async fn empty_trash(&self, ctx: &RequestContext) -> AppResult<DeleteOutcome> {
        let mut outcome = DeleteOutcome::default();
        for root in self.repo.list_trash_roots(&ctx.owner_id).await? {
            match self.permanently_delete(ctx, root.id).await {
                Ok(part) => outcome.merge(part),
                // Removed or restored by a concurrent request.
                Err(e) if matches!(e.kind, ErrorKind::NotFound | ErrorKind::InvalidOperation) => {
                    warn!(node_id = %root.id, error = %e, "Skipping trash item");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }

    async fn release_assets(&self, removed: Vec<Node>) -> DeleteOutcome {
        let mut outcome = DeleteOutcome::default();
        for node in removed {
            outcome.deleted.push(node.id);
            let Some(key) = node.storage_key.filter(|_| !node.is_folder) else {
                continue;
            };
            match self.media.release(&key).await {
                Ok(()) => outcome.released_assets += 1,
                Err(e) => {
                    warn!(
                        node_id = %node.id,
                        storage_key = %key,
                        error = %e,
                        "Failed to release asset after delete"
                    );
                    outcome.release_failures.push(ReleaseFailure {
                        node_id: node.id,
                        storage_key: key,
                        message: e.message,
                    });
                }
            }
        }
        outcome
    }
}
