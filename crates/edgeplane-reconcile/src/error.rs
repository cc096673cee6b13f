//! Reconciliation error types.
//!
//! Every variant is fatal for the lifecycle call that raised it. The two
//! non-fatal conditions (a cache behaviour already gone on delete, a failed
//! removal from a previous distribution) are reported as warnings in
//! [`Diagnostics`](crate::Diagnostics) instead.

use edgeplane_storage::{ErrorCategory, StoreError};

use crate::identity::ResourceKind;

/// Errors that abort a lifecycle call.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The parent distribution does not exist.
    #[error("distribution {distribution_id} not found")]
    ParentNotFound { distribution_id: String },

    /// The sub-resource is not present in its distribution.
    #[error(
        "the {kind} {key} can not be found in distribution {distribution_id}, it has been modified or removed"
    )]
    EntryNotFound {
        kind: ResourceKind,
        key: String,
        distribution_id: String,
    },

    /// Another writer changed the distribution since it was fetched.
    #[error("distribution {distribution_id} was modified concurrently, version {expected} is stale")]
    Conflict {
        distribution_id: String,
        expected: String,
    },

    /// An update would give the sub-resource an identity another entry already has.
    #[error("the {kind} {key} already exists in distribution {distribution_id}")]
    KeyCollision {
        kind: ResourceKind,
        key: String,
        distribution_id: String,
    },

    /// The store could not be reached or failed the request.
    #[error("store failure on distribution {distribution_id}: {source}")]
    Transport {
        distribution_id: String,
        #[source]
        source: StoreError,
    },

    /// The declared sub-resource cannot be mapped to a document entry.
    #[error("invalid {kind}: {message}")]
    InvalidResource { kind: ResourceKind, message: String },

    /// A collection's declared quantity disagrees with its length.
    #[error("distribution {distribution_id} is inconsistent: {message}")]
    InconsistentDocument {
        distribution_id: String,
        message: String,
    },
}

impl ReconcileError {
    /// Classifies a store failure for `distribution_id`.
    #[must_use]
    pub fn from_store(distribution_id: impl Into<String>, err: StoreError) -> Self {
        let distribution_id = distribution_id.into();
        match err {
            StoreError::NotFound { .. } => Self::ParentNotFound { distribution_id },
            StoreError::VersionConflict { expected, .. } => Self::Conflict {
                distribution_id,
                expected,
            },
            source => Self::Transport {
                distribution_id,
                source,
            },
        }
    }

    #[must_use]
    pub fn entry_not_found(
        kind: ResourceKind,
        key: impl ToString,
        distribution_id: impl Into<String>,
    ) -> Self {
        Self::EntryNotFound {
            kind,
            key: key.to_string(),
            distribution_id: distribution_id.into(),
        }
    }

    #[must_use]
    pub fn invalid_resource(kind: ResourceKind, message: impl Into<String>) -> Self {
        Self::InvalidResource {
            kind,
            message: message.into(),
        }
    }

    /// Returns `true` if this is a stale-version conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns `true` if the distribution or the entry was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ParentNotFound { .. } | Self::EntryNotFound { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ParentNotFound { .. } | Self::EntryNotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } | Self::KeyCollision { .. } => ErrorCategory::Conflict,
            Self::Transport { source, .. } => source.category(),
            Self::InvalidResource { .. } | Self::InconsistentDocument { .. } => {
                ErrorCategory::Validation
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_store_classification() {
        let err = ReconcileError::from_store("d1", StoreError::not_found("d1"));
        assert!(matches!(err, ReconcileError::ParentNotFound { .. }));

        let err = ReconcileError::from_store("d1", StoreError::version_conflict("d1", "E1"));
        assert!(err.is_conflict());
        assert_eq!(
            err.to_string(),
            "distribution d1 was modified concurrently, version E1 is stale"
        );

        let err = ReconcileError::from_store("d1", StoreError::connection_error("refused"));
        assert!(matches!(err, ReconcileError::Transport { .. }));
        assert_eq!(err.category(), ErrorCategory::Infrastructure);
    }

    #[test]
    fn test_entry_not_found_message_names_identity() {
        let err = ReconcileError::entry_not_found(ResourceKind::Origin, "o1", "d1");
        assert_eq!(
            err.to_string(),
            "the origin o1 can not be found in distribution d1, it has been modified or removed"
        );
        assert!(err.is_not_found());
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
