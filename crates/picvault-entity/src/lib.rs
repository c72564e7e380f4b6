//! # picvault-entity
//!
//! Domain entity models for PicVault. Files and folders share one table
//! row type, [`Node`], and are told apart at the API boundary through the
//! tagged [`NodeKind`].
//!
//! [`Node`]: node::Node
//! [`NodeKind`]: node::NodeKind

pub mod node;
