use std::fmt;

use edgeplane_storage::{
    AllowedMethods, CacheBehavior, DistributionConfig, EventType, FunctionAssociation, HttpMethod,
    ItemList, LambdaFunctionAssociation, TrustedAccess, ViewerProtocolPolicy,
};
use serde::{Deserialize, Serialize};

use super::require;
use crate::error::ReconcileError;
use crate::identity::{MissingEntryPolicy, ResourceKind, SubResource};

/// Identity of a cache behaviour inside its distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheBehaviourKey {
    pub origin_id: String,
    pub path_pattern: String,
}

impl CacheBehaviourKey {
    pub fn new(origin_id: impl Into<String>, path_pattern: impl Into<String>) -> Self {
        Self {
            origin_id: origin_id.into(),
            path_pattern: path_pattern.into(),
        }
    }
}

impl fmt::Display for CacheBehaviourKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin_id, self.path_pattern)
    }
}

/// A declared cache behaviour. `origin_id` names the origin it routes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheBehaviourResource {
    pub distribution_id: String,
    pub origin_id: String,
    pub path_pattern: String,
    pub viewer_protocol_policy: ViewerProtocolPolicy,
    pub cache_policy_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<AllowedMethodsSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_level_encryption_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_associations: Vec<FunctionAssociationSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lambda_function_associations: Vec<LambdaAssociationSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_request_policy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_log_config_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers_policy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smooth_streaming: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_key_groups: Option<TrustedKeyGroupsSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_signers: Option<TrustedSignersSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedMethodsSettings {
    pub allowed_methods: Vec<HttpMethod>,
    #[serde(default)]
    pub cached_methods: Vec<HttpMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionAssociationSettings {
    pub event_type: EventType,
    pub function_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LambdaAssociationSettings {
    pub event_type: EventType,
    pub function_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_body: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedKeyGroupsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedSignersSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub signers: Vec<String>,
}

impl CacheBehaviourResource {
    pub fn new(
        distribution_id: impl Into<String>,
        origin_id: impl Into<String>,
        path_pattern: impl Into<String>,
        viewer_protocol_policy: ViewerProtocolPolicy,
        cache_policy_id: impl Into<String>,
    ) -> Self {
        Self {
            distribution_id: distribution_id.into(),
            origin_id: origin_id.into(),
            path_pattern: path_pattern.into(),
            viewer_protocol_policy,
            cache_policy_id: cache_policy_id.into(),
            allowed_methods: None,
            compress: None,
            field_level_encryption_id: None,
            function_associations: Vec::new(),
            lambda_function_associations: Vec::new(),
            origin_request_policy_id: None,
            realtime_log_config_arn: None,
            response_headers_policy_id: None,
            smooth_streaming: None,
            trusted_key_groups: None,
            trusted_signers: None,
        }
    }

    fn methods(&self) -> AllowedMethods {
        match &self.allowed_methods {
            Some(settings) if !settings.allowed_methods.is_empty() => AllowedMethods {
                methods: ItemList::from_items(settings.allowed_methods.clone()),
                cached_methods: ItemList::from_items(settings.cached_methods.clone()),
            },
            _ => AllowedMethods::read_only(),
        }
    }
}

/// Empty members disable the restriction regardless of `enabled`.
fn trusted_access(enabled: Option<bool>, members: &[String]) -> TrustedAccess {
    if members.is_empty() {
        return TrustedAccess::default();
    }
    TrustedAccess {
        enabled: enabled.unwrap_or(false),
        members: ItemList::from_items(members.to_vec()),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl SubResource for CacheBehaviourResource {
    type Entry = CacheBehavior;
    type Key = CacheBehaviourKey;

    const KIND: ResourceKind = ResourceKind::CacheBehaviour;
    const MISSING_ON_DELETE: MissingEntryPolicy = MissingEntryPolicy::Warn;

    fn distribution_id(&self) -> &str {
        &self.distribution_id
    }

    fn key(&self) -> CacheBehaviourKey {
        CacheBehaviourKey::new(&self.origin_id, &self.path_pattern)
    }

    fn matches(entry: &CacheBehavior, key: &CacheBehaviourKey) -> bool {
        entry.target_origin_id == key.origin_id && entry.path_pattern == key.path_pattern
    }

    fn to_entry(&self) -> Result<CacheBehavior, ReconcileError> {
        require(Self::KIND, "distribution_id", &self.distribution_id)?;
        require(Self::KIND, "origin_id", &self.origin_id)?;
        require(Self::KIND, "path_pattern", &self.path_pattern)?;
        require(Self::KIND, "cache_policy_id", &self.cache_policy_id)?;

        let function_associations = self
            .function_associations
            .iter()
            .map(|f| FunctionAssociation {
                function_arn: f.function_arn.clone(),
                event_type: f.event_type,
            })
            .collect();
        let lambda_function_associations = self
            .lambda_function_associations
            .iter()
            .map(|l| LambdaFunctionAssociation {
                lambda_function_arn: l.function_arn.clone(),
                event_type: l.event_type,
                include_body: l.include_body.unwrap_or(false),
            })
            .collect();

        let trusted_key_groups = match &self.trusted_key_groups {
            Some(groups) => trusted_access(groups.enabled, &groups.groups),
            None => TrustedAccess::default(),
        };
        let trusted_signers = match &self.trusted_signers {
            Some(signers) => trusted_access(signers.enabled, &signers.signers),
            None => TrustedAccess::default(),
        };

        Ok(CacheBehavior {
            path_pattern: self.path_pattern.clone(),
            target_origin_id: self.origin_id.clone(),
            viewer_protocol_policy: self.viewer_protocol_policy,
            allowed_methods: self.methods(),
            cache_policy_id: Some(self.cache_policy_id.clone()),
            compress: self.compress.unwrap_or(true),
            field_level_encryption_id: self.field_level_encryption_id.clone().unwrap_or_default(),
            function_associations: ItemList::from_items(function_associations),
            lambda_function_associations: ItemList::from_items(lambda_function_associations),
            origin_request_policy_id: non_empty(&self.origin_request_policy_id),
            realtime_log_config_arn: non_empty(&self.realtime_log_config_arn),
            response_headers_policy_id: non_empty(&self.response_headers_policy_id),
            smooth_streaming: self.smooth_streaming.unwrap_or(false),
            trusted_key_groups,
            trusted_signers,
            other: Default::default(),
        })
    }

    fn collection(config: &DistributionConfig) -> &ItemList<CacheBehavior> {
        &config.cache_behaviors
    }

    fn collection_mut(config: &mut DistributionConfig) -> &mut ItemList<CacheBehavior> {
        &mut config.cache_behaviors
    }
}
