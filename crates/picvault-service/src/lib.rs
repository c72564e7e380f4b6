//! # picvault-service
//!
//! Business logic service layer for PicVault. [`NodeService`] implements
//! every operation on the file/folder tree on top of a
//! `picvault_database::NodeRepository`; [`UploadService`] runs the two-step
//! upload (media store first, metadata row second).
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod node;

pub use context::RequestContext;
pub use node::{DeleteOutcome, NewFile, NodeService, ReleaseFailure, UploadParams, UploadService};
