//! Folder creation handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use picvault_entity::node::NodeView;

use crate::dto::request::{CreateFolderRequest, validate_body};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, JsonBody};
use crate::state::AppState;

/// POST /api/folders/create
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<NodeView>>)> {
    validate_body(&req)?;

    let folder = state
        .node_service
        .create_folder(&auth, &req.name, req.parent_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder.into()))))
}
