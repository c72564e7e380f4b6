//! Node entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use picvault_core::types::NodeId;

use super::kind::{FileAttributes, NodeKind};

/// Content type recorded for folder rows.
pub const FOLDER_CONTENT_TYPE: &str = "inode/directory";

/// Upper bound on ancestor-chain walks. A chain longer than this is
/// treated as corrupt rather than followed forever.
pub const MAX_TREE_DEPTH: usize = 64;

/// A file or folder row in the `nodes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// Identity-provider subject that owns this node.
    pub owner_id: String,
    /// Containing folder (null for root-level nodes).
    pub parent_id: Option<NodeId>,
    /// Display name.
    pub name: String,
    /// Denormalized full path, e.g. `/Photos/cat.jpg`.
    pub path: String,
    /// Size in bytes (0 for folders).
    pub size_bytes: i64,
    /// MIME type, or [`FOLDER_CONTENT_TYPE`].
    pub content_type: String,
    /// External location of the stored asset.
    pub storage_url: Option<String>,
    /// External location of the preview asset.
    pub thumbnail_url: Option<String>,
    /// Media store reference used to release the asset.
    pub storage_key: Option<String>,
    /// Whether this node is a folder.
    pub is_folder: bool,
    /// Whether the owner starred this node.
    pub is_starred: bool,
    /// Soft-delete marker.
    pub is_trashed: bool,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Check if this is a root-level node (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Typed view of the file/folder variant.
    pub fn kind(&self) -> NodeKind {
        if self.is_folder {
            NodeKind::Folder
        } else {
            NodeKind::File(FileAttributes {
                size_bytes: self.size_bytes.max(0) as u64,
                content_type: self.content_type.clone(),
                storage_url: self.storage_url.clone(),
                thumbnail_url: self.thumbnail_url.clone(),
                storage_key: self.storage_key.clone(),
            })
        }
    }

    /// Path of a child named `name` directly below `parent`
    /// (or at the root when `parent` is `None`).
    pub fn child_path(parent: Option<&Node>, name: &str) -> String {
        match parent {
            Some(parent) => format!("{}/{}", parent.path.trim_end_matches('/'), name),
            None => format!("/{name}"),
        }
    }

    /// Rewrites a descendant path after this subtree's root moved from
    /// `old_prefix` to `new_prefix`.
    pub fn rebase_path(path: &str, old_prefix: &str, new_prefix: &str) -> String {
        match path.strip_prefix(old_prefix) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                format!("{new_prefix}{rest}")
            }
            _ => path.to_string(),
        }
    }
}

/// Data required to insert a node. The path is derived from the parent
/// inside the write transaction, so it is not part of this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNode {
    /// The owning identity-provider subject.
    pub owner_id: String,
    /// Parent folder (None for root).
    pub parent_id: Option<NodeId>,
    /// Already-normalized name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub content_type: String,
    /// External asset URL.
    pub storage_url: Option<String>,
    /// External preview URL.
    pub thumbnail_url: Option<String>,
    /// Media store reference.
    pub storage_key: Option<String>,
    /// Whether the node is a folder.
    pub is_folder: bool,
}

impl NewNode {
    /// Folder insert data.
    pub fn folder(owner_id: impl Into<String>, parent_id: Option<NodeId>, name: String) -> Self {
        Self {
            owner_id: owner_id.into(),
            parent_id,
            name,
            size_bytes: 0,
            content_type: FOLDER_CONTENT_TYPE.to_string(),
            storage_url: None,
            thumbnail_url: None,
            storage_key: None,
            is_folder: true,
        }
    }

    /// Builds the row for this insert with a fresh id and timestamps.
    pub fn into_node(self, path: String) -> Node {
        let now = Utc::now();
        Node {
            id: NodeId::new(),
            owner_id: self.owner_id,
            parent_id: self.parent_id,
            name: self.name,
            path,
            size_bytes: self.size_bytes,
            content_type: self.content_type,
            storage_url: self.storage_url,
            thumbnail_url: self.thumbnail_url,
            storage_key: self.storage_key,
            is_folder: self.is_folder,
            is_starred: false,
            is_trashed: false,
            created_at: now,
            updated_at: now,
        }
    }
}
