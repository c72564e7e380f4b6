//! Tagged file/folder view over the flat node row.

use chrono::{DateTime, Utc};
use serde::Serialize;

use picvault_core::types::NodeId;

use super::model::Node;

/// File-only attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttributes {
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type.
    pub content_type: String,
    /// External asset URL.
    pub storage_url: Option<String>,
    /// External preview URL.
    pub thumbnail_url: Option<String>,
    /// Media store reference; internal only.
    #[serde(skip)]
    pub storage_key: Option<String>,
}

/// Discriminates the two node variants sharing one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    /// A folder; carries no file attributes.
    Folder,
    /// A stored file.
    File(FileAttributes),
}

impl NodeKind {
    /// Whether this is the folder variant.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder)
    }
}

/// API representation of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: NodeId,
    pub owner_id: String,
    pub parent_id: Option<NodeId>,
    pub name: String,
    pub path: String,
    pub is_starred: bool,
    pub is_trashed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl From<Node> for NodeView {
    fn from(node: Node) -> Self {
        let kind = node.kind();
        Self {
            id: node.id,
            owner_id: node.owner_id,
            parent_id: node.parent_id,
            name: node.name,
            path: node.path,
            is_starred: node.is_starred,
            is_trashed: node.is_trashed,
            created_at: node.created_at,
            updated_at: node.updated_at,
            kind,
        }
    }
}
