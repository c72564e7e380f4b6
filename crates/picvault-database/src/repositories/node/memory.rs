//! In-memory node repository for tests and single-process development.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use picvault_core::error::AppError;
use picvault_core::result::AppResult;
use picvault_core::types::NodeId;
use picvault_entity::node::{ListFilter, MAX_TREE_DEPTH, NewNode, Node};

use super::{
    NodeRepository, ensure_depth, listing_order, node_not_found, renamed_path,
    require_parent_folder,
};

/// Node repository backed by a `HashMap` behind one async lock.
///
/// Each operation holds the lock for its whole duration, so cascades and
/// cycle checks observe a consistent tree.
#[derive(Debug, Default)]
pub struct MemoryNodeRepository {
    nodes: RwLock<HashMap<NodeId, Node>>,
}

impl MemoryNodeRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored rows across all owners.
    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    /// Whether the repository holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }
}

fn owned<'a>(nodes: &'a HashMap<NodeId, Node>, owner_id: &str, id: NodeId) -> Option<&'a Node> {
    nodes.get(&id).filter(|n| n.owner_id == owner_id)
}

fn sorted(mut nodes: Vec<Node>) -> Vec<Node> {
    nodes.sort_by(listing_order);
    nodes
}

/// Pre-order breadth-first walk of the subtree rooted at `root`,
/// returned with each node's depth below the root.
fn subtree(nodes: &HashMap<NodeId, Node>, owner_id: &str, root: NodeId) -> Vec<(NodeId, usize)> {
    let mut out = Vec::new();
    let mut queue = VecDeque::from([(root, 0usize)]);
    while let Some((id, depth)) = queue.pop_front() {
        out.push((id, depth));
        queue.extend(
            nodes
                .values()
                .filter(|n| n.owner_id == owner_id && n.parent_id == Some(id))
                .map(|n| (n.id, depth + 1)),
        );
    }
    out
}

/// Ancestor chain from `id` upward (node first), bounded by the depth limit.
fn chain(nodes: &HashMap<NodeId, Node>, owner_id: &str, id: NodeId) -> Vec<Node> {
    let mut out = Vec::new();
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        if out.len() >= MAX_TREE_DEPTH {
            break;
        }
        match owned(nodes, owner_id, current) {
            Some(node) => {
                cursor = node.parent_id;
                out.push(node.clone());
            }
            None => break,
        }
    }
    out
}

fn rewrite_descendant_paths(
    nodes: &mut HashMap<NodeId, Node>,
    owner_id: &str,
    root: NodeId,
    old_prefix: &str,
    new_prefix: &str,
) {
    let now = Utc::now();
    for (id, depth) in subtree(nodes, owner_id, root) {
        if depth == 0 {
            continue;
        }
        if let Some(node) = nodes.get_mut(&id) {
            node.path = Node::rebase_path(&node.path, old_prefix, new_prefix);
            node.updated_at = now;
        }
    }
}

#[async_trait]
impl NodeRepository for MemoryNodeRepository {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn find_by_id(&self, owner_id: &str, id: NodeId) -> AppResult<Option<Node>> {
        let nodes = self.nodes.read().await;
        Ok(owned(&nodes, owner_id, id).cloned())
    }

    async fn list_children(
        &self,
        owner_id: &str,
        parent_id: Option<NodeId>,
        filter: ListFilter,
    ) -> AppResult<Vec<Node>> {
        let nodes = self.nodes.read().await;
        Ok(sorted(
            nodes
                .values()
                .filter(|n| n.owner_id == owner_id && n.parent_id == parent_id && filter.matches(n))
                .cloned()
                .collect(),
        ))
    }

    async fn list_starred(&self, owner_id: &str) -> AppResult<Vec<Node>> {
        let nodes = self.nodes.read().await;
        Ok(sorted(
            nodes
                .values()
                .filter(|n| n.owner_id == owner_id && ListFilter::Starred.matches(n))
                .cloned()
                .collect(),
        ))
    }

    async fn list_trash_roots(&self, owner_id: &str) -> AppResult<Vec<Node>> {
        let nodes = self.nodes.read().await;
        Ok(sorted(
            nodes
                .values()
                .filter(|n| n.owner_id == owner_id && n.is_trashed)
                .filter(|n| {
                    n.parent_id
                        .and_then(|p| nodes.get(&p))
                        .is_none_or(|parent| !parent.is_trashed)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn ancestors(&self, owner_id: &str, id: NodeId) -> AppResult<Vec<Node>> {
        let nodes = self.nodes.read().await;
        if owned(&nodes, owner_id, id).is_none() {
            return Err(node_not_found(id));
        }
        let mut chain = chain(&nodes, owner_id, id);
        chain.reverse();
        Ok(chain)
    }

    async fn insert(&self, new: NewNode) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;

        let path = match new.parent_id {
            Some(parent_id) => {
                let parent = require_parent_folder(
                    owned(&nodes, &new.owner_id, parent_id).cloned(),
                    parent_id,
                )?;
                ensure_depth(chain(&nodes, &new.owner_id, parent_id).len(), 0)?;
                Node::child_path(Some(&parent), &new.name)
            }
            None => Node::child_path(None, &new.name),
        };

        let node = new.into_node(path);
        debug!(node_id = %node.id, path = %node.path, "Inserting node");
        nodes.insert(node.id, node.clone());
        Ok(node)
    }

    async fn toggle_star(&self, owner_id: &str, id: NodeId) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;
        let node = nodes
            .get_mut(&id)
            .filter(|n| n.owner_id == owner_id)
            .ok_or_else(|| node_not_found(id))?;
        node.is_starred = !node.is_starred;
        node.updated_at = Utc::now();
        Ok(node.clone())
    }

    async fn set_trashed(&self, owner_id: &str, id: NodeId, trashed: bool) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;
        let node = owned(&nodes, owner_id, id).ok_or_else(|| node_not_found(id))?;

        if !trashed {
            if let Some(parent) = node.parent_id.and_then(|p| owned(&nodes, owner_id, p)) {
                if parent.is_trashed {
                    return Err(AppError::invalid_operation(format!(
                        "Cannot restore {id} while its parent folder is in the trash"
                    )));
                }
            }
        }

        let now = Utc::now();
        for (member, _) in subtree(&nodes, owner_id, id) {
            if let Some(n) = nodes.get_mut(&member) {
                n.is_trashed = trashed;
                n.updated_at = now;
            }
        }

        nodes.get(&id).cloned().ok_or_else(|| node_not_found(id))
    }

    async fn move_node(
        &self,
        owner_id: &str,
        id: NodeId,
        new_parent_id: Option<NodeId>,
    ) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;
        let node = owned(&nodes, owner_id, id)
            .cloned()
            .ok_or_else(|| node_not_found(id))?;
        if node.is_trashed {
            return Err(AppError::invalid_operation(format!(
                "Cannot move {id} while it is in the trash"
            )));
        }

        let new_path = match new_parent_id {
            Some(parent_id) => {
                if parent_id == id {
                    return Err(AppError::invalid_operation("Cannot move a folder into itself"));
                }
                let parent = require_parent_folder(
                    owned(&nodes, owner_id, parent_id).cloned(),
                    parent_id,
                )?;
                let chain = chain(&nodes, owner_id, parent_id);
                if chain.iter().any(|a| a.id == id) {
                    return Err(AppError::invalid_operation(
                        "Cannot move a folder into one of its descendants",
                    ));
                }
                let height = subtree(&nodes, owner_id, id)
                    .iter()
                    .map(|(_, depth)| *depth)
                    .max()
                    .unwrap_or(0);
                ensure_depth(chain.len(), height)?;
                Node::child_path(Some(&parent), &node.name)
            }
            None => Node::child_path(None, &node.name),
        };

        let old_path = node.path.clone();
        if let Some(n) = nodes.get_mut(&id) {
            n.parent_id = new_parent_id;
            n.path = new_path.clone();
            n.updated_at = Utc::now();
        }
        rewrite_descendant_paths(&mut nodes, owner_id, id, &old_path, &new_path);

        nodes.get(&id).cloned().ok_or_else(|| node_not_found(id))
    }

    async fn rename(&self, owner_id: &str, id: NodeId, name: &str) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;
        let node = owned(&nodes, owner_id, id)
            .cloned()
            .ok_or_else(|| node_not_found(id))?;

        let new_path = renamed_path(&node.path, name);
        if let Some(n) = nodes.get_mut(&id) {
            n.name = name.to_string();
            n.path = new_path.clone();
            n.updated_at = Utc::now();
        }
        rewrite_descendant_paths(&mut nodes, owner_id, id, &node.path, &new_path);

        nodes.get(&id).cloned().ok_or_else(|| node_not_found(id))
    }

    async fn delete_subtree(&self, owner_id: &str, id: NodeId) -> AppResult<Vec<Node>> {
        let mut nodes = self.nodes.write().await;
        if owned(&nodes, owner_id, id).is_none() {
            return Err(node_not_found(id));
        }

        let mut members = subtree(&nodes, owner_id, id);
        if members
            .iter()
            .any(|(m, _)| nodes.get(m).is_some_and(|n| !n.is_trashed))
        {
            return Err(AppError::invalid_operation(format!(
                "Node {id} and all of its contents must be in the trash before deletion"
            )));
        }

        members.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(members
            .into_iter()
            .filter_map(|(m, _)| nodes.remove(&m))
            .collect())
    }
}
