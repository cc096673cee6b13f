//! Sub-resource identity and lookup.
//!
//! [`SubResource`] is the one seam between the generic [`Reconciler`](crate::Reconciler)
//! and a concrete kind: it says how a declared record is identified, where its
//! entries live in the parent document, how it becomes an entry, and what
//! happens around removal.

use std::fmt;

use edgeplane_storage::{DistributionConfig, ItemList};

use crate::error::ReconcileError;
use crate::mutator::CollectionMutator;

/// The sub-resource kinds managed inside a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Origin,
    CacheBehaviour,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin => write!(f, "origin"),
            Self::CacheBehaviour => write!(f, "cache behaviour"),
        }
    }
}

/// What a delete does when the entry is already gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEntryPolicy {
    /// Fail the call.
    Fatal,
    /// Warn and report the state as removed.
    Warn,
}

/// A kind of entry managed inside a distribution document.
pub trait SubResource: Clone + Send + Sync + 'static {
    /// The entry type stored in the parent collection.
    type Entry: Clone + Send + Sync;
    /// Identity key used to find an entry in its collection.
    type Key: Clone + PartialEq + fmt::Display + Send + Sync;

    const KIND: ResourceKind;
    const MISSING_ON_DELETE: MissingEntryPolicy;

    /// Id of the parent distribution.
    fn distribution_id(&self) -> &str;

    /// This record's identity key.
    fn key(&self) -> Self::Key;

    /// Whether `entry` carries `key`.
    fn matches(entry: &Self::Entry, key: &Self::Key) -> bool;

    /// Maps the declared record to a fully defaulted document entry.
    fn to_entry(&self) -> Result<Self::Entry, ReconcileError>;

    fn collection(config: &DistributionConfig) -> &ItemList<Self::Entry>;

    fn collection_mut(config: &mut DistributionConfig) -> &mut ItemList<Self::Entry>;

    /// Removes the entry at `index`, plus anything that depends on it.
    ///
    /// Returns the identity keys of dependents removed along with it.
    fn detach(config: &mut DistributionConfig, index: usize) -> Vec<String> {
        Self::collection_mut(config).remove_at(index);
        Vec::new()
    }
}

/// Finds the index of the entry carrying `key`.
///
/// Linear scan; collections are bounded by the remote API to a few dozen entries.
pub fn locate<K: SubResource>(collection: &ItemList<K::Entry>, key: &K::Key) -> Option<usize> {
    collection.iter().position(|entry| K::matches(entry, key))
}

#[cfg(test)]
mod tests {
    use edgeplane_storage::{CacheBehavior, Origin, ViewerProtocolPolicy};

    use super::*;
    use crate::resources::{CacheBehaviourKey, CacheBehaviourResource, OriginResource};

    #[test]
    fn test_locate_origin_by_id() {
        let origins = ItemList::from_items(vec![
            Origin::new("o1", "a.example"),
            Origin::new("o2", "b.example"),
        ]);
        assert_eq!(locate::<OriginResource>(&origins, &"o2".to_string()), Some(1));
        assert_eq!(locate::<OriginResource>(&origins, &"o3".to_string()), None);
    }

    #[test]
    fn test_locate_behaviour_needs_both_key_parts() {
        let behaviours = ItemList::from_items(vec![
            CacheBehavior::new("o1", "/a/*", ViewerProtocolPolicy::AllowAll, "cp"),
            CacheBehavior::new("o2", "/a/*", ViewerProtocolPolicy::AllowAll, "cp"),
        ]);

        let key = CacheBehaviourKey::new("o2", "/a/*");
        assert_eq!(locate::<CacheBehaviourResource>(&behaviours, &key), Some(1));

        let key = CacheBehaviourKey::new("o1", "/b/*");
        assert_eq!(locate::<CacheBehaviourResource>(&behaviours, &key), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ResourceKind::CacheBehaviour.to_string(), "cache behaviour");
        assert_eq!(ResourceKind::Origin.to_string(), "origin");
    }
}
