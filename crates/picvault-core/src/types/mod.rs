//! Core type definitions used across the PicVault workspace.

pub mod id;

pub use id::*;
