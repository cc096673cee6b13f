//! Declared sub-resource records and their document mappings.

mod cache_behaviour;
mod origin;

pub use cache_behaviour::{
    AllowedMethodsSettings, CacheBehaviourKey, CacheBehaviourResource, FunctionAssociationSettings,
    LambdaAssociationSettings, TrustedKeyGroupsSettings, TrustedSignersSettings,
};
pub use origin::{
    CustomHeader, CustomOriginSettings, OriginResource, OriginShieldSettings, S3OriginSettings,
    S3_ACCESS_IDENTITY_PREFIX,
};

use crate::error::ReconcileError;
use crate::identity::ResourceKind;

fn require(kind: ResourceKind, field: &str, value: &str) -> Result<(), ReconcileError> {
    if value.trim().is_empty() {
        return Err(ReconcileError::invalid_resource(kind, format!("{field} must not be empty")));
    }
    Ok(())
}
