//! Lifecycle behaviour against the in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use edgeplane_db_memory::{InMemoryStore, create_store};
use edgeplane_reconcile::{
    CacheBehaviourResource, OriginResource, Provider, ReconcileError,
};
use edgeplane_storage::{
    DistributionConfig, DistributionStore, Origin, StoreError, VersionToken,
    VersionedConfig, ViewerProtocolPolicy,
};
use serde_json::json;

fn behaviour(distribution_id: &str, origin_id: &str, path: &str) -> CacheBehaviourResource {
    CacheBehaviourResource::new(
        distribution_id,
        origin_id,
        path,
        ViewerProtocolPolicy::RedirectToHttps,
        "658327ea-f89d-4fab-a63d-7e88639e58f6",
    )
}

fn behaviour_keys(config: &DistributionConfig) -> Vec<(String, String)> {
    config
        .cache_behaviors
        .iter()
        .map(|b| (b.target_origin_id.clone(), b.path_pattern.clone()))
        .collect()
}

fn seeded() -> (Arc<InMemoryStore>, Provider) {
    let store = create_store();
    store.insert(
        "d1",
        DistributionConfig::new().with_field("Comment", "production".into()),
    );
    let provider = Provider::new(store.clone());
    (store, provider)
}

fn current(store: &InMemoryStore, distribution_id: &str) -> DistributionConfig {
    store.snapshot(distribution_id).unwrap().config
}

#[tokio::test]
async fn create_then_read_round_trips() {
    let (store, provider) = seeded();
    let mut desired = OriginResource::new("d1", "assets", "assets.s3.amazonaws.com");
    desired.origin_path = Some("/static".into());

    let created = provider.origins().create(&desired).await.unwrap();
    assert_eq!(created.state.as_ref(), Some(&desired));
    assert!(created.version.is_some());
    assert!(created.diagnostics.is_empty());

    let read = provider.origins().read(created.state.as_ref().unwrap());
    assert_eq!(read.state, Some(desired));

    let config = current(&store, "d1");
    assert_eq!(config.origins.quantity, 1);
    assert_eq!(config.origins.items[0].origin_path, "/static");
    assert_eq!(config.other["Comment"], "production");
}

#[tokio::test]
async fn retried_create_does_not_duplicate() {
    let (store, provider) = seeded();
    let desired = behaviour("d1", "o1", "/img/*");

    provider.cache_behaviours().create(&desired).await.unwrap();
    provider.cache_behaviours().create(&desired).await.unwrap();

    let config = current(&store, "d1");
    assert_eq!(config.cache_behaviors.quantity, 1);
    assert_eq!(config.cache_behaviors.len(), 1);
}

#[tokio::test]
async fn create_allows_behaviour_without_origin() {
    let (store, provider) = seeded();
    provider
        .cache_behaviours()
        .create(&behaviour("d1", "not-yet-created", "/late/*"))
        .await
        .unwrap();
    assert_eq!(current(&store, "d1").cache_behaviors.quantity, 1);
}

#[tokio::test]
async fn deleting_origin_cascades_to_its_behaviours() {
    let (store, provider) = seeded();
    provider
        .origins()
        .create(&OriginResource::new("d1", "o1", "a.example"))
        .await
        .unwrap();
    for (origin, path) in [("o1", "/a/*"), ("o1", "/b/*"), ("o2", "/c/*")] {
        provider
            .cache_behaviours()
            .create(&behaviour("d1", origin, path))
            .await
            .unwrap();
    }

    let response = provider
        .origins()
        .delete(&OriginResource::new("d1", "o1", "a.example"))
        .await
        .unwrap();

    assert!(response.state.is_none());
    assert_eq!(response.cascaded, vec!["o1:/a/*".to_string(), "o1:/b/*".to_string()]);
    let config = current(&store, "d1");
    assert_eq!(config.origins.quantity, 0);
    assert_eq!(config.cache_behaviors.quantity, 1);
    assert_eq!(behaviour_keys(&config), vec![("o2".to_string(), "/c/*".to_string())]);
}

#[tokio::test]
async fn path_change_replaces_located_by_old_key() {
    let (store, provider) = seeded();
    provider
        .cache_behaviours()
        .create(&behaviour("d1", "o2", "/keep/*"))
        .await
        .unwrap();
    let prior = behaviour("d1", "o1", "/old/*");
    provider.cache_behaviours().create(&prior).await.unwrap();

    let mut desired = behaviour("d1", "o1", "/new/*");
    desired.compress = Some(false);
    let response = provider.cache_behaviours().update(&prior, &desired).await.unwrap();
    assert_eq!(response.state, Some(desired));

    let config = current(&store, "d1");
    assert_eq!(
        behaviour_keys(&config),
        vec![
            ("o2".to_string(), "/keep/*".to_string()),
            ("o1".to_string(), "/new/*".to_string()),
        ]
    );
    assert!(!config.cache_behaviors.items[1].compress);
    assert_eq!(config.cache_behaviors.quantity, 2);
}

#[tokio::test]
async fn update_of_drifted_entry_adds_it_back() {
    let (store, provider) = seeded();
    let prior = OriginResource::new("d1", "o1", "a.example");

    let desired = OriginResource::new("d1", "o1", "b.example");
    provider.origins().update(&prior, &desired).await.unwrap();

    let config = current(&store, "d1");
    assert_eq!(config.origins.quantity, 1);
    assert_eq!(config.origins.items[0].domain_name, "b.example");
}

#[tokio::test]
async fn update_onto_existing_key_is_rejected() {
    let (store, provider) = seeded();
    let first = behaviour("d1", "o1", "/a/*");
    let second = behaviour("d1", "o1", "/b/*");
    provider.cache_behaviours().create(&first).await.unwrap();
    provider.cache_behaviours().create(&second).await.unwrap();
    let writes = store.write_count();

    let err = provider
        .cache_behaviours()
        .update(&first, &behaviour("d1", "o1", "/b/*"))
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::KeyCollision { .. }));
    assert_eq!(store.write_count(), writes);
}

#[tokio::test]
async fn deleting_missing_behaviour_warns_without_writing() {
    let (store, provider) = seeded();
    provider
        .cache_behaviours()
        .create(&behaviour("d1", "o1", "/present/*"))
        .await
        .unwrap();
    let before = store.snapshot("d1").unwrap();

    let response = provider
        .cache_behaviours()
        .delete(&behaviour("d1", "o1", "/absent/*"))
        .await
        .unwrap();

    assert!(response.state.is_none());
    assert!(response.version.is_none());
    let warnings: Vec<_> = response.diagnostics.iter().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].summary, "failed to delete cache behaviour from distribution");
    assert_eq!(
        warnings[0].detail,
        "the cache behaviour o1:/absent/* can not be found in distribution d1, it has been modified or removed"
    );
    assert_eq!(store.snapshot("d1").unwrap(), before);
}

#[tokio::test]
async fn deleting_missing_origin_is_fatal() {
    let (_store, provider) = seeded();
    let err = provider
        .origins()
        .delete(&OriginResource::new("d1", "ghost", "a.example"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::EntryNotFound { .. }));
}

#[tokio::test]
async fn missing_distribution_is_fatal_for_every_write() {
    let (_store, provider) = seeded();
    let origin = OriginResource::new("nope", "o1", "a.example");

    let err = provider.origins().create(&origin).await.unwrap_err();
    assert!(matches!(err, ReconcileError::ParentNotFound { .. }));

    let err = provider.origins().update(&origin, &origin).await.unwrap_err();
    assert!(matches!(err, ReconcileError::ParentNotFound { .. }));

    let err = provider
        .cache_behaviours()
        .delete(&behaviour("nope", "o1", "/a/*"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::ParentNotFound { .. }));
}

#[tokio::test]
async fn moving_origin_between_distributions() {
    let (store, provider) = seeded();
    store.insert("d2", DistributionConfig::new());

    let prior = OriginResource::new("d1", "o1", "a.example");
    provider.origins().create(&prior).await.unwrap();
    provider
        .cache_behaviours()
        .create(&behaviour("d1", "o1", "/a/*"))
        .await
        .unwrap();

    let desired = OriginResource::new("d2", "o1", "a.example");
    let response = provider.origins().update(&prior, &desired).await.unwrap();

    assert!(response.diagnostics.is_empty());
    assert_eq!(response.cascaded, vec!["o1:/a/*".to_string()]);

    let old = current(&store, "d1");
    assert!(old.origins.is_empty());
    assert!(old.cache_behaviors.is_empty());
    assert_eq!(old.origins.quantity, 0);

    let new = current(&store, "d2");
    assert_eq!(new.origins.quantity, 1);
    assert_eq!(new.origins.items[0].id, "o1");
}

#[tokio::test]
async fn move_from_vanished_distribution_warns() {
    let (store, provider) = seeded();
    store.insert("d2", DistributionConfig::new());

    let prior = behaviour("gone", "o1", "/a/*");
    let desired = behaviour("d2", "o1", "/a/*");
    let response = provider.cache_behaviours().update(&prior, &desired).await.unwrap();

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(current(&store, "d2").cache_behaviors.quantity, 1);
}

/// Lets another writer land between a caller's fetch and its write.
struct RacingStore {
    inner: InMemoryStore,
    race: AtomicBool,
}

#[async_trait]
impl DistributionStore for RacingStore {
    async fn fetch(&self, distribution_id: &str) -> Result<VersionedConfig, StoreError> {
        let fetched = self.inner.fetch(distribution_id).await?;
        if self.race.swap(false, Ordering::SeqCst) {
            let mut theirs = fetched.config.clone();
            theirs.origins.items.push(Origin::new("theirs", "t.example"));
            theirs.origins.quantity += 1;
            self.inner.write(distribution_id, &theirs, &fetched.version).await?;
        }
        Ok(fetched)
    }

    async fn write(
        &self,
        distribution_id: &str,
        config: &DistributionConfig,
        if_match: &VersionToken,
    ) -> Result<VersionToken, StoreError> {
        self.inner.write(distribution_id, config, if_match).await
    }

    fn backend_name(&self) -> &'static str {
        "racing"
    }
}

#[tokio::test]
async fn concurrent_write_fails_with_conflict() {
    let store = Arc::new(RacingStore {
        inner: InMemoryStore::new(),
        race: AtomicBool::new(true),
    });
    store.inner.insert("d1", DistributionConfig::new());
    let provider = Provider::new(store.clone());

    let err = provider
        .origins()
        .create(&OriginResource::new("d1", "ours", "o.example"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let stored = store.inner.snapshot("d1").unwrap();
    let expected = DistributionConfig::new().with_origins(vec![Origin::new("theirs", "t.example")]);
    assert_eq!(
        serde_json::to_vec(&stored.config).unwrap(),
        serde_json::to_vec(&expected).unwrap()
    );
}

/// Store whose every call fails at the transport level.
struct UnreachableStore;

#[async_trait]
impl DistributionStore for UnreachableStore {
    async fn fetch(&self, _distribution_id: &str) -> Result<VersionedConfig, StoreError> {
        Err(StoreError::connection_error("connection refused"))
    }

    async fn write(
        &self,
        _distribution_id: &str,
        _config: &DistributionConfig,
        _if_match: &VersionToken,
    ) -> Result<VersionToken, StoreError> {
        Err(StoreError::connection_error("connection refused"))
    }

    fn backend_name(&self) -> &'static str {
        "unreachable"
    }
}

#[tokio::test]
async fn transport_failure_is_fatal_even_for_behaviour_delete() {
    let provider = Provider::new(Arc::new(UnreachableStore));
    let err = provider
        .cache_behaviours()
        .delete(&behaviour("d1", "o1", "/a/*"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::Transport { .. }));
}

#[tokio::test]
async fn dependents_survive_unrelated_origin_delete() {
    let (store, provider) = seeded();
    for id in ["o1", "o2"] {
        provider
            .origins()
            .create(&OriginResource::new("d1", id, format!("{id}.example")))
            .await
            .unwrap();
    }
    provider
        .cache_behaviours()
        .create(&behaviour("d1", "o2", "/keep/*"))
        .await
        .unwrap();

    let response = provider
        .origins()
        .delete(&OriginResource::new("d1", "o1", "o1.example"))
        .await
        .unwrap();
    assert!(response.cascaded.is_empty());

    let config = current(&store, "d1");
    assert_eq!(config.origins.items.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(), vec!["o2"]);
    assert_eq!(config.cache_behaviors.quantity, 1);
}

#[tokio::test]
async fn moving_behaviour_between_distributions() {
    let (store, provider) = seeded();
    store.insert("d2", DistributionConfig::new());
    provider
        .cache_behaviours()
        .create(&behaviour("d1", "o1", "/keep/*"))
        .await
        .unwrap();
    let prior = behaviour("d1", "o1", "/a/*");
    provider.cache_behaviours().create(&prior).await.unwrap();

    let desired = behaviour("d2", "o1", "/a/*");
    let response = provider.cache_behaviours().update(&prior, &desired).await.unwrap();

    assert!(response.diagnostics.is_empty());
    assert!(response.cascaded.is_empty());
    assert_eq!(response.state, Some(desired));

    let old = current(&store, "d1");
    assert_eq!(old.cache_behaviors.quantity, 1);
    assert_eq!(behaviour_keys(&old), vec![("o1".to_string(), "/keep/*".to_string())]);

    let new = current(&store, "d2");
    assert_eq!(new.cache_behaviors.quantity, 1);
    assert_eq!(behaviour_keys(&new), vec![("o1".to_string(), "/a/*".to_string())]);
}

/// A distribution holding an origin and a legacy behaviour with members the
/// wire types do not model.
fn foreign_document() -> DistributionConfig {
    serde_json::from_value(json!({
        "Comment": "managed elsewhere",
        "Origins": {"Quantity": 1, "Items": [{
            "Id": "legacy",
            "DomainName": "legacy.example",
            "OriginPath": "",
            "CustomHeaders": {"Quantity": 0},
            "VpcOriginConfig": {"VpcOriginId": "vo-0123", "OriginKeepaliveTimeout": 5},
            "ResponseCompletionTimeout": 30
        }]},
        "CacheBehaviors": {"Quantity": 1, "Items": [{
            "PathPattern": "/old/*",
            "TargetOriginId": "legacy",
            "ViewerProtocolPolicy": "allow-all",
            "AllowedMethods": {
                "Quantity": 2,
                "Items": ["HEAD", "GET"],
                "CachedMethods": {"Quantity": 2, "Items": ["HEAD", "GET"]}
            },
            "ForwardedValues": {"QueryString": true, "Cookies": {"Forward": "all"}},
            "MinTTL": 0,
            "DefaultTTL": 3600,
            "MaxTTL": 86400,
            "GrpcConfig": {"Enabled": false}
        }]}
    }))
    .unwrap()
}

#[tokio::test]
async fn untouched_entries_survive_write_back() {
    let store = create_store();
    let original = foreign_document();
    store.insert("d1", original.clone());
    let provider = Provider::new(store.clone());
    let untouched = |config: &DistributionConfig| {
        let value = serde_json::to_value(config).unwrap();
        (
            value["Origins"]["Items"][0].clone(),
            value["CacheBehaviors"]["Items"][0].clone(),
        )
    };
    let expected = untouched(&original);

    let origin = OriginResource::new("d1", "o2", "b.example");
    provider.origins().create(&origin).await.unwrap();
    let mut edited = origin.clone();
    edited.origin_path = Some("/v2".into());
    provider.origins().update(&origin, &edited).await.unwrap();
    let routed = behaviour("d1", "o2", "/new/*");
    provider.cache_behaviours().create(&routed).await.unwrap();
    assert_eq!(untouched(&current(&store, "d1")), expected);

    provider.cache_behaviours().delete(&routed).await.unwrap();
    provider.origins().delete(&edited).await.unwrap();

    let config = current(&store, "d1");
    assert_eq!(untouched(&config), expected);
    assert_eq!(config.origins.quantity, 1);
    assert_eq!(config.cache_behaviors.quantity, 1);
    assert!(config.cache_behaviors.items[0].cache_policy_id.is_none());
    assert_eq!(config.other["Comment"], "managed elsewhere");
    assert_eq!(store.write_count(), 5);
}
