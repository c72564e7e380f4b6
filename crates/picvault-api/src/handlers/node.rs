//! Node listing, lookup and mutation handlers.

use axum::Json;
use axum::extract::State;

use picvault_entity::node::NodeView;

use crate::dto::request::{ListNodesQuery, MoveNodeRequest, RenameNodeRequest, validate_body};
use crate::dto::response::{ApiResponse, DeleteResponse, node_views};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, JsonBody, NodeIdPath, QueryParams};
use crate::state::AppState;

type NodeResponse = ApiResult<Json<ApiResponse<NodeView>>>;
type NodeListResponse = ApiResult<Json<ApiResponse<Vec<NodeView>>>>;

/// GET /api/nodes?parentId=...&filter=active|starred|trashed
pub async fn list_nodes(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ListNodesQuery>,
) -> NodeListResponse {
    let filter = query.list_filter()?;
    let nodes = state
        .node_service
        .list_children(&auth, query.parent_id, filter)
        .await?;
    Ok(Json(ApiResponse::ok(node_views(nodes))))
}

/// GET /api/nodes/starred
pub async fn list_starred(State(state): State<AppState>, auth: AuthUser) -> NodeListResponse {
    let nodes = state.node_service.list_starred(&auth).await?;
    Ok(Json(ApiResponse::ok(node_views(nodes))))
}

/// GET /api/nodes/trash
pub async fn list_trash(State(state): State<AppState>, auth: AuthUser) -> NodeListResponse {
    let nodes = state.node_service.list_trash(&auth).await?;
    Ok(Json(ApiResponse::ok(node_views(nodes))))
}

/// DELETE /api/nodes/trash
pub async fn empty_trash(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<DeleteResponse>>> {
    let outcome = state.node_service.empty_trash(&auth).await?;
    Ok(Json(ApiResponse::ok(outcome.into())))
}

/// GET /api/nodes/{id}
pub async fn get_node(
    State(state): State<AppState>,
    auth: AuthUser,
    NodeIdPath(id): NodeIdPath,
) -> NodeResponse {
    let node = state.node_service.get_node(&auth, id).await?;
    Ok(Json(ApiResponse::ok(node.into())))
}

/// GET /api/nodes/{id}/ancestors
pub async fn ancestors(
    State(state): State<AppState>,
    auth: AuthUser,
    NodeIdPath(id): NodeIdPath,
) -> NodeListResponse {
    let chain = state.node_service.ancestors(&auth, id).await?;
    Ok(Json(ApiResponse::ok(node_views(chain))))
}

/// PATCH /api/nodes/{id}/star
pub async fn toggle_star(
    State(state): State<AppState>,
    auth: AuthUser,
    NodeIdPath(id): NodeIdPath,
) -> NodeResponse {
    let node = state.node_service.toggle_star(&auth, id).await?;
    Ok(Json(ApiResponse::ok(node.into())))
}

/// PATCH /api/nodes/{id}/trash
pub async fn move_to_trash(
    State(state): State<AppState>,
    auth: AuthUser,
    NodeIdPath(id): NodeIdPath,
) -> NodeResponse {
    let node = state.node_service.move_to_trash(&auth, id).await?;
    Ok(Json(ApiResponse::ok(node.into())))
}

/// PATCH /api/nodes/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    NodeIdPath(id): NodeIdPath,
) -> NodeResponse {
    let node = state.node_service.restore_from_trash(&auth, id).await?;
    Ok(Json(ApiResponse::ok(node.into())))
}

/// PATCH /api/nodes/{id}/move
pub async fn move_node(
    State(state): State<AppState>,
    auth: AuthUser,
    NodeIdPath(id): NodeIdPath,
    JsonBody(req): JsonBody<MoveNodeRequest>,
) -> NodeResponse {
    let node = state
        .node_service
        .move_node(&auth, id, req.parent_id)
        .await?;
    Ok(Json(ApiResponse::ok(node.into())))
}

/// PATCH /api/nodes/{id}/rename
pub async fn rename(
    State(state): State<AppState>,
    auth: AuthUser,
    NodeIdPath(id): NodeIdPath,
    JsonBody(req): JsonBody<RenameNodeRequest>,
) -> NodeResponse {
    validate_body(&req)?;
    let node = state.node_service.rename_node(&auth, id, &req.name).await?;
    Ok(Json(ApiResponse::ok(node.into())))
}

/// DELETE /api/nodes/{id}
pub async fn delete_node(
    State(state): State<AppState>,
    auth: AuthUser,
    NodeIdPath(id): NodeIdPath,
) -> ApiResult<Json<ApiResponse<DeleteResponse>>> {
    let outcome = state.node_service.permanently_delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(outcome.into())))
}
