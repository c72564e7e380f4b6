//! Core traits defined in `picvault-core` and implemented by other crates.

pub mod media;

pub use media::{MediaStore, StoredAsset};
