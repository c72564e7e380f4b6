//! Node tree repository.
//!
//! Every structural write is atomic in both backends: the Postgres
//! implementation wraps each operation (including its cascade) in one
//! transaction holding a per-owner advisory lock, and the in-memory
//! implementation holds a single write lock for the whole operation.
//! Every query is scoped by `owner_id`; a node owned by someone else is
//! indistinguishable from a missing one.

pub mod memory;
pub mod postgres;

use std::cmp::Ordering;

use async_trait::async_trait;

use picvault_core::error::AppError;
use picvault_core::result::AppResult;
use picvault_core::types::NodeId;
use picvault_entity::node::{ListFilter, MAX_TREE_DEPTH, NewNode, Node};

pub use memory::MemoryNodeRepository;
pub use postgres::PgNodeRepository;

/// Persistence contract for the node tree.
#[async_trait]
pub trait NodeRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend name ("postgres" or "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Find a node owned by `owner_id`.
    async fn find_by_id(&self, owner_id: &str, id: NodeId) -> AppResult<Option<Node>>;

    /// Immediate children of `parent_id` (root level when `None`), in
    /// listing order. The parent itself is not validated here.
    async fn list_children(
        &self,
        owner_id: &str,
        parent_id: Option<NodeId>,
        filter: ListFilter,
    ) -> AppResult<Vec<Node>>;

    /// Every starred, non-trashed node of the owner, in listing order.
    async fn list_starred(&self, owner_id: &str) -> AppResult<Vec<Node>>;

    /// Trashed nodes whose parent is absent or not trashed, in listing order.
    async fn list_trash_roots(&self, owner_id: &str) -> AppResult<Vec<Node>>;

    /// Ancestor chain of a node ordered root first, ending with the node.
    async fn ancestors(&self, owner_id: &str, id: NodeId) -> AppResult<Vec<Node>>;

    /// Insert a node after validating its parent. The path is derived
    /// from the parent inside the same atomic unit.
    async fn insert(&self, node: NewNode) -> AppResult<Node>;

    /// Flip the starred flag.
    async fn toggle_star(&self, owner_id: &str, id: NodeId) -> AppResult<Node>;

    /// Set or clear `is_trashed` on a node and its entire subtree.
    ///
    /// Clearing fails with `InvalidOperation` while the parent is trashed.
    async fn set_trashed(&self, owner_id: &str, id: NodeId, trashed: bool) -> AppResult<Node>;

    /// Re-parent a node, rewriting its path and every descendant path.
    async fn move_node(
        &self,
        owner_id: &str,
        id: NodeId,
        new_parent_id: Option<NodeId>,
    ) -> AppResult<Node>;

    /// Rename a node, rewriting its path and every descendant path.
    async fn rename(&self, owner_id: &str, id: NodeId, name: &str) -> AppResult<Node>;

    /// Delete a fully trashed subtree, deepest rows first, and return
    /// every removed row.
    async fn delete_subtree(&self, owner_id: &str, id: NodeId) -> AppResult<Vec<Node>>;
}

/// Listing order: folders first, then name by byte order, then creation
/// time, then id. Postgres reproduces this with `ORDER BY is_folder DESC,
/// name COLLATE "C", created_at, id`.
pub fn listing_order(a: &Node, b: &Node) -> Ordering {
    b.is_folder
        .cmp(&a.is_folder)
        .then_with(|| a.name.as_bytes().cmp(b.name.as_bytes()))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Check that a looked-up parent can receive children.
pub(crate) fn require_parent_folder(parent: Option<Node>, parent_id: NodeId) -> AppResult<Node> {
    let parent = parent.ok_or_else(|| AppError::not_found(format!("Parent folder {parent_id} not found")))?;
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
    Ok(parent)
}

/// Reject placing a subtree of height `subtree_height` (0 for a single
/// node) under a parent whose chain holds `parent_chain_len` nodes, when
/// its deepest member would end up past the depth bound.
pub(crate) fn ensure_depth(parent_chain_len: usize, subtree_height: usize) -> AppResult<()> {
    if parent_chain_len + 1 + subtree_height > MAX_TREE_DEPTH {
        return Err(AppError::invalid_operation(format!(
            "Folders cannot be nested deeper than {MAX_TREE_DEPTH} levels"
        )));
    }
    Ok(())
}

/// Path of a node after renaming it in place.
pub(crate) fn renamed_path(old_path: &str, name: &str) -> String {
    let dir = old_path.rfind('/').map(|i| &old_path[..i]).unwrap_or("");
    format!("{dir}/{name}")
}

pub(crate) fn node_not_found(id: NodeId) -> AppError {
    AppError::not_found(format!("Node {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_depth_counts_subtree_height() {
        assert!(ensure_depth(MAX_TREE_DEPTH - 1, 0).is_ok());
        assert!(ensure_depth(MAX_TREE_DEPTH, 0).is_err());
        assert!(ensure_depth(40, 23).is_ok());
        assert!(ensure_depth(40, 24).is_err());
    }

    #[test]
    fn test_renamed_path() {
        assert_eq!(renamed_path("/Photos", "Pictures"), "/Pictures");
        assert_eq!(renamed_path("/Photos/2024/cat.jpg", "dog.jpg"), "/Photos/2024/dog.jpg");
    }

    #[test]
    fn test_listing_order_puts_folders_first() {
        let file = NewNode {
            is_folder: false,
            content_type: "image/png".into(),
            ..NewNode::folder("o", None, "a.png".into())
        }
        .into_node("/a.png".into());
        let folder = NewNode::folder("o", None, "zeta".into()).into_node("/zeta".into());
        let upper = NewNode::folder("o", None, "Zeta".into()).into_node("/Zeta".into());

        let mut nodes = vec![file.clone(), folder.clone(), upper.clone()];
        nodes.sort_by(listing_order);
        let names: Vec<_> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "zeta", "a.png"]);
    }
}
