//! Media store provider implementations.

#[cfg(feature = "local")]
pub mod local;
pub mod memory;

#[cfg(feature = "local")]
pub use local::LocalMediaStore;
pub use memory::MemoryMediaStore;
