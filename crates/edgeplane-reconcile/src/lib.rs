//! # edgeplane-reconcile
//!
//! Reconciles declared origins and cache behaviours into the shared
//! distribution documents that hold them.
//!
//! Every lifecycle call fetches the parent document, locates the entry by its
//! identity key, mutates the counted collection in place and writes the whole
//! document back guarded by the version token it was read at. A concurrent
//! writer makes the call fail with [`ReconcileError::Conflict`].
//!
//! Deleting an origin also removes every cache behaviour targeting it; the
//! store would refuse the write otherwise.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use edgeplane_db_memory::InMemoryStore;
//! use edgeplane_reconcile::{OriginResource, Provider};
//!
//! let provider = Provider::new(Arc::new(InMemoryStore::new()));
//! let response = provider
//!     .origins()
//!     .create(&OriginResource::new("E2QWRUHAPOMQZL", "assets", "assets.s3.amazonaws.com"))
//!     .await?;
//! ```

pub mod cascade;
mod diagnostics;
mod error;
pub mod guard;
mod identity;
pub mod mutator;
mod provider;
mod reconciler;
pub mod resources;

pub use cascade::{CascadeReport, cascade_delete_origin};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::ReconcileError;
pub use guard::{WriteOutcome, guarded_write};
pub use identity::{MissingEntryPolicy, ResourceKind, SubResource, locate};
pub use mutator::CollectionMutator;
pub use provider::Provider;
pub use reconciler::{LifecycleResponse, Reconciler};
pub use resources::{CacheBehaviourKey, CacheBehaviourResource, OriginResource};

/// Type alias for a lifecycle result.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
