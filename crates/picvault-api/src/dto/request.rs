//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use picvault_core::error::AppError;
use picvault_core::types::NodeId;
use picvault_entity::node::ListFilter;

/// Create folder request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name is required"))]
    pub name: String,
    /// Parent folder; omitted or `null` for the root level.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
}

/// Move request body. `parentId: null` moves to the root level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeRequest {
    /// New parent folder.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
}

/// Rename request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameNodeRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
}

/// Query string of `GET /api/nodes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNodesQuery {
    /// Folder to list; absent for the root level.
    pub parent_id: Option<NodeId>,
    /// `active` (default), `starred` or `trashed`.
    pub filter: Option<String>,
}

impl ListNodesQuery {
    /// Parses the filter, defaulting to `active`.
    pub fn list_filter(&self) -> Result<ListFilter, AppError> {
        match self.filter.as_deref().map(str::trim) {
            None | Some("") => Ok(ListFilter::default()),
            Some(raw) => raw.parse().map_err(AppError::invalid_argument),
        }
    }
}

/// Runs `validator` rules, mapping failures to `InvalidArgument`.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|e| AppError::invalid_argument(format!("Validation failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_folder_accepts_camel_case() {
        let id = NodeId::new();
        let body: CreateFolderRequest =
            serde_json::from_str(&format!(r#"{{"name":"Photos","parentId":"{id}"}}"#)).unwrap();
        assert_eq!(body.parent_id, Some(id));
        assert!(validate_body(&body).is_ok());

        let body: CreateFolderRequest = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(body.parent_id.is_none());
        assert!(validate_body(&body).is_err());
    }

    #[test]
    fn test_move_to_root_with_null_parent() {
        let body: MoveNodeRequest = serde_json::from_str(r#"{"parentId":null}"#).unwrap();
        assert!(body.parent_id.is_none());
        let body: MoveNodeRequest = serde_json::from_str("{}").unwrap();
        assert!(body.parent_id.is_none());
    }

    #[test]
    fn test_list_filter() {
        let q = ListNodesQuery::default();
        assert_eq!(q.list_filter().unwrap(), ListFilter::Active);
        let q = ListNodesQuery {
            filter: Some("trashed".into()),
            ..Default::default()
        };
        assert_eq!(q.list_filter().unwrap(), ListFilter::Trashed);
        let q = ListNodesQuery {
            filter: Some("bogus".into()),
            ..Default::default()
        };
        assert!(q.list_filter().is_err());
    }
}
