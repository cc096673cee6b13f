//! Lifecycle calls for one sub-resource kind.
//!
//! Each call is a single fetch, locate, mutate, write sequence against the
//! parent distribution. Nothing is cached between calls and a stale version
//! at write time fails the call.

use std::marker::PhantomData;

use edgeplane_storage::{DistributionConfig, DynStore, VersionToken, VersionedConfig};
use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::error::ReconcileError;
use crate::guard::guarded_write;
use crate::identity::{MissingEntryPolicy, SubResource, locate};
use crate::mutator::CollectionMutator;

/// Result of a lifecycle call.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleResponse<R> {
    /// New state, or `None` when the resource should be forgotten.
    pub state: Option<R>,
    pub diagnostics: Diagnostics,
    /// Distribution version after the call's write, if one happened.
    pub version: Option<VersionToken>,
    /// Keys of dependents removed along with the resource.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cascaded: Vec<String>,
}

impl<R> LifecycleResponse<R> {
    fn stored(state: R, version: VersionToken, diagnostics: Diagnostics) -> Self {
        Self {
            state: Some(state),
            diagnostics,
            version: Some(version),
            cascaded: Vec::new(),
        }
    }

    fn removed(version: Option<VersionToken>, cascaded: Vec<String>, diagnostics: Diagnostics) -> Self {
        Self {
            state: None,
            diagnostics,
            version,
            cascaded,
        }
    }
}

enum Detachment {
    Removed {
        version: VersionToken,
        cascaded: Vec<String>,
    },
    Missing,
}

/// Drives create/read/update/delete for sub-resource kind `K`.
pub struct Reconciler<K> {
    store: DynStore,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for Reconciler<K> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: SubResource> Reconciler<K> {
    pub fn new(store: DynStore) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    /// Adds `desired` to its distribution.
    ///
    /// An entry already carrying the same key is replaced rather than
    /// duplicated, so a retried create converges.
    #[tracing::instrument(
        skip_all,
        fields(kind = %K::KIND, distribution_id = desired.distribution_id(), key = %desired.key())
    )]
    pub async fn create(&self, desired: &K) -> Result<LifecycleResponse<K>, ReconcileError> {
        let entry = desired.to_entry()?;
        let distribution_id = desired.distribution_id();
        let VersionedConfig { mut config, version } = self.fetch(distribution_id).await?;

        let collection = K::collection_mut(&mut config);
        match locate::<K>(collection, &desired.key()) {
            Some(index) => {
                tracing::debug!(index, "entry already present, replacing in place");
                collection.replace_at(index, entry);
            }
            None => collection.insert(entry),
        }

        let version = self.commit(distribution_id, &config, &version).await?;
        Ok(LifecycleResponse::stored(desired.clone(), version, Diagnostics::new()))
    }

    /// Returns `prior` unchanged. The store is not consulted.
    pub fn read(&self, prior: &K) -> LifecycleResponse<K> {
        LifecycleResponse {
            state: Some(prior.clone()),
            diagnostics: Diagnostics::new(),
            version: None,
            cascaded: Vec::new(),
        }
    }

    /// Replaces the entry `prior` describes with `desired`.
    ///
    /// When the distribution changed, the entry is first removed from the old
    /// one; a failure there is a warning. The entry is located by the prior
    /// key, then by the desired key, and appended if neither is present.
    #[tracing::instrument(
        skip_all,
        fields(
            kind = %K::KIND,
            distribution_id = desired.distribution_id(),
            prior_key = %prior.key(),
            key = %desired.key(),
        )
    )]
    pub async fn update(&self, prior: &K, desired: &K) -> Result<LifecycleResponse<K>, ReconcileError> {
        let entry = desired.to_entry()?;
        let mut diagnostics = Diagnostics::new();
        let moved = prior.distribution_id() != desired.distribution_id();

        let mut cascaded = Vec::new();
        if moved {
            match self.detach_from(prior).await {
                Ok(Detachment::Removed { cascaded: removed, .. }) => cascaded = removed,
                Ok(Detachment::Missing) => diagnostics.add_warning(
                    format!("failed to remove {} from previous distribution", K::KIND),
                    ReconcileError::entry_not_found(K::KIND, prior.key(), prior.distribution_id())
                        .to_string(),
                ),
                Err(err) => {
                    tracing::warn!(
                        previous = prior.distribution_id(),
                        error = %err,
                        "could not remove entry from previous distribution"
                    );
                    diagnostics.add_warning(
                        format!("failed to remove {} from previous distribution", K::KIND),
                        err.to_string(),
                    );
                }
            }
        }

        let distribution_id = desired.distribution_id();
        let VersionedConfig { mut config, version } = self.fetch(distribution_id).await?;

        let desired_key = desired.key();
        let collection = K::collection_mut(&mut config);
        let prior_index = if moved {
            None
        } else {
            locate::<K>(collection, &prior.key())
        };
        let desired_index = locate::<K>(collection, &desired_key);

        let index = match (prior_index, desired_index) {
            (Some(at), Some(other)) if at != other => {
                return Err(ReconcileError::KeyCollision {
                    kind: K::KIND,
                    key: desired_key.to_string(),
                    distribution_id: distribution_id.to_string(),
                });
            }
            (Some(at), _) => Some(at),
            (None, found) => found,
        };

        match index {
            Some(index) => {
                collection.replace_at(index, entry);
            }
            None => {
                if !moved {
                    tracing::warn!("entry missing from distribution, adding it again");
                }
                collection.insert(entry);
            }
        }

        let version = self.commit(distribution_id, &config, &version).await?;
        let mut response = LifecycleResponse::stored(desired.clone(), version, diagnostics);
        response.cascaded = cascaded;
        Ok(response)
    }

    /// Removes the entry `state` describes.
    #[tracing::instrument(
        skip_all,
        fields(kind = %K::KIND, distribution_id = state.distribution_id(), key = %state.key())
    )]
    pub async fn delete(&self, state: &K) -> Result<LifecycleResponse<K>, ReconcileError> {
        let mut diagnostics = Diagnostics::new();
        match self.detach_from(state).await? {
            Detachment::Removed { version, cascaded } => {
                Ok(LifecycleResponse::removed(Some(version), cascaded, diagnostics))
            }
            Detachment::Missing => {
                let missing =
                    ReconcileError::entry_not_found(K::KIND, state.key(), state.distribution_id());
                tracing::warn!(error = %missing, "entry already gone");
                diagnostics.add_warning(
                    format!("failed to delete {} from distribution", K::KIND),
                    missing.to_string(),
                );
                Ok(LifecycleResponse::removed(None, Vec::new(), diagnostics))
            }
        }
    }

    async fn detach_from(&self, state: &K) -> Result<Detachment, ReconcileError> {
        let distribution_id = state.distribution_id();
        let key = state.key();
        let VersionedConfig { mut config, version } = self.fetch(distribution_id).await?;

        let Some(index) = locate::<K>(K::collection(&config), &key) else {
            return match K::MISSING_ON_DELETE {
                MissingEntryPolicy::Fatal => {
                    Err(ReconcileError::entry_not_found(K::KIND, key, distribution_id))
                }
                MissingEntryPolicy::Warn => Ok(Detachment::Missing),
            };
        };

        let cascaded = K::detach(&mut config, index);
        let version = self.commit(distribution_id, &config, &version).await?;
        Ok(Detachment::Removed { version, cascaded })
    }

    async fn fetch(&self, distribution_id: &str) -> Result<VersionedConfig, ReconcileError> {
        let fetched = self
            .store
            .fetch(distribution_id)
            .await
            .map_err(|err| ReconcileError::from_store(distribution_id, err))?;
        check_consistent(distribution_id, &fetched.config)?;
        tracing::debug!(version = %fetched.version, "fetched distribution");
        Ok(fetched)
    }

    async fn commit(
        &self,
        distribution_id: &str,
        config: &DistributionConfig,
        expected: &VersionToken,
    ) -> Result<VersionToken, ReconcileError> {
        check_consistent(distribution_id, config)?;
        let version = guarded_write(self.store.as_ref(), distribution_id, config, expected)
            .await
            .into_result(distribution_id)?;
        tracing::info!(%version, "distribution updated");
        Ok(version)
    }
}

fn check_consistent(distribution_id: &str, config: &DistributionConfig) -> Result<(), ReconcileError> {
    match config.inconsistency() {
        Some(message) => Err(ReconcileError::InconsistentDocument {
            distribution_id: distribution_id.to_string(),
            message,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use edgeplane_db_memory::InMemoryStore;
    use edgeplane_storage::{ItemList, Origin};

    use super::*;
    use crate::resources::OriginResource;

    #[test]
    fn test_read_never_touches_store() {
        let store = Arc::new(InMemoryStore::new());
        let reconciler = Reconciler::<OriginResource>::new(store.clone());

        let prior = OriginResource::new("absent", "o1", "a.example");
        let response = reconciler.read(&prior);

        assert_eq!(response.state, Some(prior));
        assert!(response.version.is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_drifted_counter_is_rejected_before_write() {
        let store = Arc::new(InMemoryStore::new());
        let mut config = DistributionConfig::new();
        config.origins = ItemList {
            quantity: 2,
            items: vec![Origin::new("o1", "a.example")],
        };
        store.insert("d1", config);

        let reconciler = Reconciler::<OriginResource>::new(store.clone());
        let err = reconciler
            .create(&OriginResource::new("d1", "o2", "b.example"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::InconsistentDocument { .. }));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_resource_fails_before_fetch() {
        let store = Arc::new(InMemoryStore::new());
        let reconciler = Reconciler::<OriginResource>::new(store);

        let err = reconciler
            .create(&OriginResource::new("missing", "o1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidResource { .. }));
    }
}
