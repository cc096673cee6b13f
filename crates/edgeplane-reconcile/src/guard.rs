//! Conditional write of a distribution, classified.

use edgeplane_storage::{DistributionConfig, DistributionStore, StoreError, VersionToken};

use crate::error::ReconcileError;

/// Result of a write guarded by the version token read at fetch time.
#[derive(Debug)]
pub enum WriteOutcome {
    /// The document was replaced; carries the new version.
    Written(VersionToken),
    /// The store's version moved on since the fetch. Nothing was written.
    Conflict { expected: VersionToken },
    /// The distribution no longer exists.
    NotFound,
    /// Any other store failure.
    TransportError(StoreError),
}

impl WriteOutcome {
    /// Classifies a raw store write result.
    #[must_use]
    pub fn classify(result: Result<VersionToken, StoreError>, expected: &VersionToken) -> Self {
        match result {
            Ok(version) => Self::Written(version),
            Err(StoreError::VersionConflict { .. }) => Self::Conflict {
                expected: expected.clone(),
            },
            Err(StoreError::NotFound { .. }) => Self::NotFound,
            Err(err) => Self::TransportError(err),
        }
    }

    /// Converts the outcome into the lifecycle call's result.
    ///
    /// A conflict is not retried; it fails the call.
    pub fn into_result(self, distribution_id: &str) -> Result<VersionToken, ReconcileError> {
        match self {
            Self::Written(version) => Ok(version),
            Self::Conflict { expected } => Err(ReconcileError::Conflict {
                distribution_id: distribution_id.to_string(),
                expected: expected.to_string(),
            }),
            Self::NotFound => Err(ReconcileError::ParentNotFound {
                distribution_id: distribution_id.to_string(),
            }),
            Self::TransportError(source) => Err(ReconcileError::Transport {
                distribution_id: distribution_id.to_string(),
                source,
            }),
        }
    }
}

/// Writes `config` back only if the store still holds version `expected`.
pub async fn guarded_write(
    store: &dyn DistributionStore,
    distribution_id: &str,
    config: &DistributionConfig,
    expected: &VersionToken,
) -> WriteOutcome {
    let result = store.write(distribution_id, config, expected).await;
    let outcome = WriteOutcome::classify(result, expected);
    match &outcome {
        WriteOutcome::Written(version) => {
            tracing::debug!(distribution_id, %expected, %version, "distribution written");
        }
        WriteOutcome::Conflict { .. } => {
            tracing::warn!(distribution_id, %expected, "distribution changed since fetch, write rejected");
        }
        WriteOutcome::NotFound => {
            tracing::warn!(distribution_id, "distribution disappeared before write");
        }
        WriteOutcome::TransportError(err) => {
            tracing::error!(distribution_id, category = %err.category(), error = %err, "distribution write failed");
        }
    }
    outcome
}
