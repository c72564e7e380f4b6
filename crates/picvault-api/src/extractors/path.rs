//! Typed path parameter helpers.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use picvault_core::error::AppError;
use picvault_core::types::NodeId;

use crate::error::ApiError;

/// Parses a node id from a path segment.
pub fn parse_node_id(s: &str) -> Result<NodeId, AppError> {
    s.parse::<NodeId>()
        .map_err(|_| AppError::invalid_argument(format!("Invalid node id: {s}")))
}

/// `{id}` path segment parsed as a [`NodeId`].
///
/// Malformed ids are rejected with the standard error body instead of
/// Axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct NodeIdPath(pub NodeId);

impl<S: Send + Sync> FromRequestParts<S> for NodeIdPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::invalid_argument(format!("Invalid path: {e}")))?;
        Ok(Self(parse_node_id(&raw)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_id() {
        let id = NodeId::new();
        assert_eq!(parse_node_id(&id.to_string()).unwrap(), id);
        let err = parse_node_id("not-a-uuid").unwrap_err();
        assert_eq!(err.kind, picvault_core::error::ErrorKind::InvalidArgument);
    }
}
