//! # picvault-database
//!
//! Metadata store for the node tree: the PostgreSQL pool, migrations, and
//! the [`NodeRepository`] trait with its Postgres and in-memory backends.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use repositories::node::{MemoryNodeRepository, NodeRepository, PgNodeRepository};
pub use store::NodeStore;
