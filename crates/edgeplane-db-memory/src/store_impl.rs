//! Implementation of the DistributionStore trait for InMemoryStore.

use std::sync::atomic::Ordering;

use async_trait::async_trait;
use edgeplane_storage::{
    DistributionConfig, DistributionStore, StoreError, VersionToken, VersionedConfig,
};

use crate::storage::InMemoryStore;

#[async_trait]
impl DistributionStore for InMemoryStore {
    async fn fetch(&self, distribution_id: &str) -> Result<VersionedConfig, StoreError> {
        self.snapshot(distribution_id)
            .ok_or_else(|| StoreError::not_found(distribution_id))
    }

    async fn write(
        &self,
        distribution_id: &str,
        config: &DistributionConfig,
        if_match: &VersionToken,
    ) -> Result<VersionToken, StoreError> {
        // The remote API refuses documents whose counters drift from their lists
        if let Some(message) = config.inconsistency() {
            return Err(StoreError::invalid_document(message));
        }

        let version = {
            let mut current = self
                .data
                .get_mut(distribution_id)
                .ok_or_else(|| StoreError::not_found(distribution_id))?;

            if current.version != *if_match {
                tracing::debug!(
                    distribution_id,
                    expected = %if_match,
                    actual = %current.version,
                    "rejecting stale write"
                );
                return Err(StoreError::version_conflict(distribution_id, if_match.as_str()));
            }

            let version = self.next_version();
            current.config = config.clone();
            current.version = version.clone();
            version
        };

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(version)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
