//! Print a user's file tree.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use picvault_core::config::AppConfig;
use picvault_core::error::AppError;
use picvault_core::types::NodeId;
use picvault_entity::node::{ListFilter, Node};
use picvault_service::{NodeService, RequestContext};

/// Arguments for the tree command
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Owner id
    #[arg(short, long)]
    pub user: String,
    /// Start below this folder instead of the root level
    #[arg(short, long)]
    pub parent_id: Option<NodeId>,
    /// Maximum depth to descend
    #[arg(short, long, default_value = "8")]
    pub depth: usize,
    /// Also show trashed nodes
    #[arg(long)]
    pub include_trashed: bool,
}

/// Tree display row
#[derive(Debug, Serialize, Tabled)]
struct NodeRow {
    /// Path
    path: String,
    /// folder or file
    kind: String,
    /// Size in bytes
    size: String,
    /// Starred
    starred: bool,
    /// Trashed
    trashed: bool,
    /// Node ID
    id: String,
}

impl From<&Node> for NodeRow {
    fn from(node: &Node) -> Self {
        Self {
            path: node.path.clone(),
            kind: if node.is_folder { "folder" } else { "file" }.to_string(),
            size: if node.is_folder {
                "-".to_string()
            } else {
                node.size_bytes.to_string()
            },
            starred: node.is_starred,
            trashed: node.is_trashed,
            id: node.id.to_string(),
        }
    }
}

/// Execute the tree command
pub async fn execute(args: &TreeArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let (store, service) = super::node_service(config).await?;
    let ctx = RequestContext::new(args.user.clone());

    let mut rows = Vec::new();
    collect(&service, &ctx, args, args.parent_id, 0, &mut rows).await?;
    store.close().await;

    output::print_rows(&rows, format, "No folders or files.");
    Ok(())
}

/// Depth-first walk, children in listing order.
async fn collect(
    service: &NodeService,
    ctx: &RequestContext,
    args: &TreeArgs,
    parent_id: Option<NodeId>,
    depth: usize,
    rows: &mut Vec<NodeRow>,
) -> Result<(), AppError> {
    if depth >= args.depth {
        return Ok(());
    }

    let mut children = service.list_children(ctx, parent_id, ListFilter::Active).await?;
    if args.include_trashed {
        children.extend(
            service
                .list_children(ctx, parent_id, ListFilter::Trashed)
                .await?,
        );
        children.sort_by(picvault_database::repositories::node::listing_order);
    }

    for child in children {
        rows.push(NodeRow::from(&child));
        if child.is_folder {
            Box::pin(collect(service, ctx, args, Some(child.id), depth + 1, rows)).await?;
        }
    }
    Ok(())
}
