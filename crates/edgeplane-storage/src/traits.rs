//! Store trait for distribution documents.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{DistributionConfig, VersionToken, VersionedConfig};

/// A remote store holding versioned distribution documents.
///
/// The store only supports whole-document reads and whole-document
/// conditional writes. Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use edgeplane_storage::{DistributionStore, StoreError};
///
/// async fn touch(store: &dyn DistributionStore, id: &str) -> Result<(), StoreError> {
///     let current = store.fetch(id).await?;
///     store.write(id, &current.config, &current.version).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DistributionStore: Send + Sync {
    /// Fetches a distribution document and the version it was read at.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the distribution does not exist.
    /// Returns `StoreError::ConnectionError` if the store cannot be reached.
    async fn fetch(&self, distribution_id: &str) -> Result<VersionedConfig, StoreError>;

    /// Replaces a distribution document if its version still equals `if_match`.
    ///
    /// Returns the new version token on success. A rejected write leaves the
    /// stored document unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::VersionConflict` if `if_match` is stale.
    /// Returns `StoreError::NotFound` if the distribution does not exist.
    /// Returns `StoreError::ConnectionError` if the store cannot be reached.
    async fn write(
        &self,
        distribution_id: &str,
        config: &DistributionConfig,
        if_match: &VersionToken,
    ) -> Result<VersionToken, StoreError>;

    /// Returns the name of this store backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
