use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use edgeplane_storage::{DistributionConfig, VersionToken, VersionedConfig};

/// In-memory distribution store.
///
/// Each document sits behind its own map shard lock, so the version check
/// and the replacement in [`write`](edgeplane_storage::DistributionStore::write)
/// happen atomically. Writers racing on the same document see first-writer-wins.
#[derive(Debug)]
pub struct InMemoryStore {
    /// Current document per distribution id
    pub(crate) data: Arc<DashMap<String, VersionedConfig>>,
    /// Atomic counter for generating version tokens
    pub(crate) version_counter: AtomicU64,
    /// Number of successful writes, for tests and diagnostics
    pub(crate) writes: AtomicU64,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            version_counter: AtomicU64::new(1),
            writes: AtomicU64::new(0),
        }
    }

    /// Generates the next version token.
    pub(crate) fn next_version(&self) -> VersionToken {
        let n = self.version_counter.fetch_add(1, Ordering::SeqCst);
        VersionToken::new(format!("E{n:06}"))
    }

    /// Adds or replaces a distribution unconditionally, returning its version.
    pub fn insert(&self, distribution_id: impl Into<String>, config: DistributionConfig) -> VersionToken {
        let version = self.next_version();
        self.data.insert(
            distribution_id.into(),
            VersionedConfig {
                config,
                version: version.clone(),
            },
        );
        version
    }

    /// Removes a distribution, as an out-of-band deletion would.
    pub fn remove(&self, distribution_id: &str) -> Option<DistributionConfig> {
        self.data.remove(distribution_id).map(|(_, v)| v.config)
    }

    /// Returns a copy of the current document and version.
    pub fn snapshot(&self, distribution_id: &str) -> Option<VersionedConfig> {
        self.data.get(distribution_id).map(|entry| entry.value().clone())
    }

    /// Returns the number of successful conditional writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the number of stored distributions.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if no distributions are stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
