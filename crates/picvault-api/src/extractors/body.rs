//! JSON body and query string extractors with enveloped rejections.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use picvault_core::error::AppError;

use crate::error::ApiError;

/// JSON request body. Malformed or mistyped bodies are rejected as
/// `INVALID_ARGUMENT` with the standard error envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            AppError::invalid_argument(format!("Invalid request body: {}", e.body_text()))
        })?;
        Ok(Self(value))
    }
}

/// Query string parameters, rejected the same way as [`JsonBody`].
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                AppError::invalid_argument(format!("Invalid query string: {}", e.body_text()))
            })?;
        Ok(Self(value))
    }
}
