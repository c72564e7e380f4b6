//! # picvault-storage
//!
//! Media store providers for PicVault. The node tree only records where an
//! asset lives; the bytes go to one of the providers here, selected by
//! `storage.provider`.

pub mod manager;
pub mod providers;
pub mod thumbnail;

pub use manager::{MediaManager, asset_key, sanitize_file_name};
pub use providers::MemoryMediaStore;
#[cfg(feature = "local")]
pub use providers::LocalMediaStore;
pub use thumbnail::ThumbnailGenerator;
