//! Repository implementations for PicVault entities.

pub mod node;

pub use node::{MemoryNodeRepository, NodeRepository, PgNodeRepository};
