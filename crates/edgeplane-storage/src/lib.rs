//! # edgeplane-storage
//!
//! Document model and store abstraction for edgeplane.
//!
//! A CDN distribution is one versioned document holding, among unrelated
//! settings, two counted collections: `Origins` and `CacheBehaviors`. Stores
//! expose it through two calls only:
//! - fetch the whole document with its version token
//! - write the whole document back, guarded by the token it was read at
//!
//! This crate defines the types and the [`DistributionStore`] trait. Backends
//! live in separate crates (`edgeplane-db-memory`, `edgeplane-remote`).
//!
//! ## Example
//!
//! ```ignore
//! use edgeplane_storage::{DistributionStore, StoreError};
//!
//! async fn origin_ids(store: &dyn DistributionStore, id: &str) -> Result<Vec<String>, StoreError> {
//!     let current = store.fetch(id).await?;
//!     Ok(current.config.origins.iter().map(|o| o.id.clone()).collect())
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StoreError};
pub use traits::DistributionStore;
pub use types::{
    AllowedMethods, CacheBehavior, CustomOriginConfig, DistributionConfig, EventType,
    FunctionAssociation, HttpMethod, ItemList, LambdaFunctionAssociation, Origin,
    OriginCustomHeader, OriginProtocolPolicy, OriginShield, S3OriginConfig, SslProtocol,
    TrustedAccess, VersionToken, VersionedConfig, ViewerProtocolPolicy,
};

/// Type alias for a store result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for a shareable store trait object.
pub type DynStore = std::sync::Arc<dyn DistributionStore>;
