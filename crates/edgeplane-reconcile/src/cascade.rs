//! Referential integrity between origins and cache behaviours.
//!
//! The store refuses to delete an origin that any behaviour still targets, so
//! removing an origin always takes its behaviours with it.

use edgeplane_storage::{CacheBehavior, DistributionConfig, Origin};

use crate::identity::locate;
use crate::mutator::CollectionMutator;
use crate::resources::OriginResource;

/// What a cascading origin delete removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub origin: Origin,
    /// Behaviours that targeted the origin, in their original order.
    pub removed_behaviours: Vec<CacheBehavior>,
}

/// Removes origin `origin_id` and every cache behaviour targeting it.
///
/// Returns `None`, leaving `config` untouched, if the origin is absent.
pub fn cascade_delete_origin(config: &mut DistributionConfig, origin_id: &str) -> Option<CascadeReport> {
    let index = locate::<OriginResource>(&config.origins, &origin_id.to_string())?;
    let origin = config.origins.remove_at(index);
    let removed_behaviours = config
        .cache_behaviors
        .remove_where(|behaviour| behaviour.target_origin_id == origin_id);

    if !removed_behaviours.is_empty() {
        tracing::debug!(
            origin_id,
            removed = removed_behaviours.len(),
            "removed cache behaviours targeting deleted origin"
        );
    }

    Some(CascadeReport {
        origin,
        removed_behaviours,
    })
}

#[cfg(test)]
mod tests {
    use edgeplane_storage::ViewerProtocolPolicy;

    use super::*;

    fn behaviour(origin_id: &str, path: &str) -> CacheBehavior {
        CacheBehavior::new(origin_id, path, ViewerProtocolPolicy::RedirectToHttps, "cp")
    }

    #[test]
    fn test_cascade_removes_only_referencing_behaviours() {
        let mut config = DistributionConfig::new()
            .with_origins(vec![Origin::new("o1", "a.example"), Origin::new("o2", "b.example")])
            .with_cache_behaviors(vec![
                behaviour("o1", "/a/*"),
                behaviour("o1", "/b/*"),
                behaviour("o2", "/c/*"),
            ]);

        let report = cascade_delete_origin(&mut config, "o1").unwrap();

        assert_eq!(report.origin.id, "o1");
        let paths: Vec<_> = report.removed_behaviours.iter().map(|b| b.path_pattern.as_str()).collect();
        assert_eq!(paths, vec!["/a/*", "/b/*"]);
        assert_eq!(config.origins.quantity, 1);
        assert_eq!(config.cache_behaviors.quantity, 1);
        assert_eq!(config.cache_behaviors.items[0].path_pattern, "/c/*");
        assert!(config.inconsistency().is_none());
    }

    #[test]
    fn test_cascade_without_dependents_only_removes_origin() {
        let mut config = DistributionConfig::new()
            .with_origins(vec![Origin::new("o1", "a.example")])
            .with_cache_behaviors(vec![behaviour("o2", "/c/*")]);

        let report = cascade_delete_origin(&mut config, "o1").unwrap();
        assert!(report.removed_behaviours.is_empty());
        assert!(config.origins.is_empty());
        assert_eq!(config.cache_behaviors.quantity, 1);
    }

    #[test]
    fn test_cascade_for_missing_origin_is_noop() {
        let original = DistributionConfig::new()
            .with_origins(vec![Origin::new("o2", "b.example")])
            .with_cache_behaviors(vec![behaviour("o1", "/dangling/*")]);
        let mut config = original.clone();

        assert!(cascade_delete_origin(&mut config, "o1").is_none());
        assert_eq!(config, original);
    }
}
