//! Multipart upload handler.

use axum::Json;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use bytes::Bytes;

use picvault_core::error::AppError;
use picvault_core::types::NodeId;
use picvault_entity::node::NodeView;
use picvault_service::UploadParams;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::extractors::path::parse_node_id;
use crate::state::AppState;

/// File part extracted from the form.
struct FilePart {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// POST /api/files/upload
///
/// Form fields: `file` (required), `parentId` (optional), `userId`
/// (optional; must equal the token subject when sent).
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<NodeView>>)> {
    let mut multipart = multipart.map_err(|e| {
        AppError::invalid_argument(format!("Invalid multipart body: {}", e.body_text()))
    })?;
    let mut file: Option<FilePart> = None;
    let mut parent_id: Option<NodeId> = None;
    let mut claimed_owner: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some(FilePart {
                    file_name,
                    content_type,
                    data,
                });
            }
            Some("parentId") => parent_id = parse_parent(&text(field).await?)?,
            Some("userId") => claimed_owner = Some(text(field).await?),
            // Unknown fields are drained and ignored.
            _ => {
                field.bytes().await.map_err(multipart_error)?;
            }
        }
    }

    let file = file.ok_or_else(|| AppError::invalid_argument("Missing 'file' field"))?;

    let node = state
        .upload_service
        .upload(
            &auth,
            UploadParams {
                file_name: file.file_name,
                content_type: file.content_type,
                data: file.data,
                parent_id,
                claimed_owner,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(node.into()))))
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(multipart_error)
}

/// Empty, `null` and `root` all mean the root level.
fn parse_parent(raw: &str) -> Result<Option<NodeId>, AppError> {
    match raw.trim() {
        "" | "null" | "root" => Ok(None),
        id => parse_node_id(id).map(Some),
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::invalid_argument(format!("Invalid multipart body: {e}"))
}
