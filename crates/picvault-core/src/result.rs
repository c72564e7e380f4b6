//! Convenience result type alias for PicVault.

use crate::error::AppError;

/// A specialized `Result` type for PicVault operations.
pub type AppResult<T> = Result<T, AppError>;
