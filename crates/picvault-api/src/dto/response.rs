//! Response DTOs.

use serde::{Deserialize, Serialize};

use picvault_entity::node::{Node, NodeView};
use picvault_service::DeleteOutcome;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Converts repository rows into client views.
pub fn node_views(nodes: Vec<Node>) -> Vec<NodeView> {
    nodes.into_iter().map(NodeView::from).collect()
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` when every backend answered, `degraded` otherwise.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Metadata store backend and reachability.
    pub database: BackendHealth,
    /// Media store backend and reachability.
    pub storage: BackendHealth,
}

/// Reachability of one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendHealth {
    pub provider: String,
    pub healthy: bool,
}

/// Result of a permanent delete or of emptying the trash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    /// Number of rows removed.
    pub deleted_count: usize,
    #[serde(flatten)]
    pub outcome: DeleteOutcome,
}

impl From<DeleteOutcome> for DeleteResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            deleted_count: outcome.deleted.len(),
            outcome,
        }
    }
}
