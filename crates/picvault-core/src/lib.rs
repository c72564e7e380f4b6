//! # picvault-core
//!
//! Core crate for PicVault. Contains the unified error system,
//! configuration schemas, typed identifiers, and the [`MediaStore`]
//! trait implemented by `picvault-storage`.
//!
//! This crate has **no** internal dependencies on other PicVault crates.
//!
//! [`MediaStore`]: traits::MediaStore

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
