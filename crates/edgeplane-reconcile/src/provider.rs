use std::fmt;

use edgeplane_storage::{DynStore, VersionedConfig};

use crate::error::ReconcileError;
use crate::reconciler::Reconciler;
use crate::resources::{CacheBehaviourResource, OriginResource};

/// Entry point for a host: one store, one reconciler per resource kind.
///
/// The store is injected here and shared by every reconciler the provider
/// hands out.
#[derive(Clone)]
pub struct Provider {
    store: DynStore,
}

impl Provider {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub fn origins(&self) -> Reconciler<OriginResource> {
        Reconciler::new(self.store.clone())
    }

    pub fn cache_behaviours(&self) -> Reconciler<CacheBehaviourResource> {
        Reconciler::new(self.store.clone())
    }

    /// Fetches a distribution as currently stored.
    pub async fn distribution(&self, distribution_id: &str) -> Result<VersionedConfig, ReconcileError> {
        self.store
            .fetch(distribution_id)
            .await
            .map_err(|err| ReconcileError::from_store(distribution_id, err))
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}
