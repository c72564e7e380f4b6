//! Node tree operations and uploads.

pub mod service;
pub mod upload;

pub use service::{DeleteOutcome, NewFile, NodeService, ReleaseFailure};
pub use upload::{UploadParams, UploadService};
