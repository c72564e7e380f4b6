//! Preview rendition generation.

pub mod generator;

pub use generator::ThumbnailGenerator;
