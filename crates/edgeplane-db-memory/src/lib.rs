//! In-memory distribution store for edgeplane.
//!
//! This crate provides an in-memory implementation of the `DistributionStore`
//! trait from `edgeplane-storage`, using a sharded concurrent map so that the
//! version check and document swap of a conditional write are atomic.
//!
//! # Example
//!
//! ```ignore
//! use edgeplane_db_memory::InMemoryStore;
//! use edgeplane_storage::{DistributionConfig, DistributionStore};
//!
//! let store = InMemoryStore::new();
//! let version = store.insert("E2QWRUHAPOMQZL", DistributionConfig::new());
//! let fetched = store.fetch("E2QWRUHAPOMQZL").await?;
//! assert_eq!(fetched.version, version);
//! ```

pub mod storage;
mod store_impl;

pub use edgeplane_storage::{DistributionStore, StoreError};
pub use storage::InMemoryStore;

/// Creates a new shareable in-memory store.
pub fn create_store() -> std::sync::Arc<InMemoryStore> {
    std::sync::Arc::new(InMemoryStore::new())
}
