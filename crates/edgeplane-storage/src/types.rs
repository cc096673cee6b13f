//! Distribution document types.
//!
//! The store speaks in whole [`DistributionConfig`] documents. Only the two
//! sub-resource collections are modelled field by field; every other top-level
//! member is carried through untouched in [`DistributionConfig::other`].
//! Entries and their nested configs keep members they do not model in an
//! `other` map too, so writing the document back never drops them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque concurrency token (an entity tag) assigned by the store.
///
/// Every successful write changes it. A write must present the token it read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    /// Creates a new `VersionToken`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for VersionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for VersionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A distribution document together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedConfig {
    /// The fetched document.
    pub config: DistributionConfig,
    /// The version token the document was read at.
    pub version: VersionToken,
}

/// A counted, ordered collection.
///
/// The wire format pairs every list with an explicit `Quantity` that must
/// equal the number of `Items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct ItemList<T> {
    /// Declared number of items.
    pub quantity: u32,
    /// The items, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<T>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self {
            quantity: 0,
            items: Vec::new(),
        }
    }
}

impl<T> ItemList<T> {
    /// Creates an empty list with quantity 0.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a list whose quantity matches `items`.
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            quantity: count(items.len()),
            items,
        }
    }

    /// Returns the number of items actually present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if the declared quantity equals the item count.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.quantity as usize == self.items.len()
    }

    /// Iterates over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> From<Vec<T>> for ItemList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_items(items)
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// The parent document: a CDN distribution configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DistributionConfig {
    /// Traffic origins, keyed by origin id.
    #[serde(default)]
    pub origins: ItemList<Origin>,
    /// Routing rules, keyed by (target origin id, path pattern).
    #[serde(default)]
    pub cache_behaviors: ItemList<CacheBehavior>,
    /// Every other member of the document, preserved verbatim.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl DistributionConfig {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the origins collection.
    #[must_use]
    pub fn with_origins(mut self, origins: Vec<Origin>) -> Self {
        self.origins = ItemList::from_items(origins);
        self
    }

    /// Replaces the cache behaviours collection.
    #[must_use]
    pub fn with_cache_behaviors(mut self, behaviors: Vec<CacheBehavior>) -> Self {
        self.cache_behaviors = ItemList::from_items(behaviors);
        self
    }

    /// Sets an unrelated top-level member.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.other.insert(name.into(), value);
        self
    }

    /// Describes the first collection whose quantity disagrees with its length.
    #[must_use]
    pub fn inconsistency(&self) -> Option<String> {
        if !self.origins.is_consistent() {
            return Some(format!(
                "Origins.Quantity is {} but {} items are present",
                self.origins.quantity,
                self.origins.len()
            ));
        }
        if !self.cache_behaviors.is_consistent() {
            return Some(format!(
                "CacheBehaviors.Quantity is {} but {} items are present",
                self.cache_behaviors.quantity,
                self.cache_behaviors.len()
            ));
        }
        None
    }
}

// ==================== Origins ====================

/// A traffic origin endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Origin {
    /// Unique id within the distribution.
    pub id: String,
    pub domain_name: String,
    #[serde(default)]
    pub origin_path: String,
    #[serde(default)]
    pub custom_headers: ItemList<OriginCustomHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_origin_config: Option<S3OriginConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_origin_config: Option<CustomOriginConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_shield: Option<OriginShield>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_access_control_id: Option<String>,
    /// Members not modelled above, such as `VpcOriginConfig`.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Origin {
    /// Creates a bare origin pointing at `domain_name`.
    #[must_use]
    pub fn new(id: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain_name: domain_name.into(),
            origin_path: String::new(),
            custom_headers: ItemList::empty(),
            s3_origin_config: None,
            custom_origin_config: None,
            connection_attempts: None,
            connection_timeout: None,
            origin_shield: None,
            origin_access_control_id: None,
            other: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OriginCustomHeader {
    pub header_name: String,
    pub header_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3OriginConfig {
    pub origin_access_identity: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomOriginConfig {
    #[serde(rename = "HTTPPort")]
    pub http_port: u16,
    #[serde(rename = "HTTPSPort")]
    pub https_port: u16,
    pub origin_protocol_policy: OriginProtocolPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_ssl_protocols: Option<ItemList<SslProtocol>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_read_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_keepalive_timeout: Option<u32>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OriginShield {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_shield_region: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginProtocolPolicy {
    HttpOnly,
    MatchViewer,
    HttpsOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SslProtocol {
    #[serde(rename = "SSLv3")]
    SslV3,
    #[serde(rename = "TLSv1")]
    TlsV1,
    #[serde(rename = "TLSv1.1")]
    TlsV1_1,
    #[serde(rename = "TLSv1.2")]
    TlsV1_2,
}

// ==================== Cache behaviours ====================

/// A routing and caching rule for requests matching `path_pattern`.
///
/// Behaviours configured with legacy `ForwardedValues` and TTLs carry no
/// `CachePolicyId`; those members stay in `other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheBehavior {
    pub path_pattern: String,
    /// Non-owning reference to [`Origin::id`].
    pub target_origin_id: String,
    pub viewer_protocol_policy: ViewerProtocolPolicy,
    pub allowed_methods: AllowedMethods,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_policy_id: Option<String>,
    #[serde(default)]
    pub compress: bool,
    #[serde(default)]
    pub field_level_encryption_id: String,
    #[serde(default)]
    pub function_associations: ItemList<FunctionAssociation>,
    #[serde(default)]
    pub lambda_function_associations: ItemList<LambdaFunctionAssociation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_request_policy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_log_config_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers_policy_id: Option<String>,
    #[serde(default)]
    pub smooth_streaming: bool,
    #[serde(default)]
    pub trusted_key_groups: TrustedAccess,
    #[serde(default)]
    pub trusted_signers: TrustedAccess,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl CacheBehavior {
    /// Creates a behaviour with read-only methods, compression on and no
    /// edge functions or access restrictions.
    #[must_use]
    pub fn new(
        target_origin_id: impl Into<String>,
        path_pattern: impl Into<String>,
        viewer_protocol_policy: ViewerProtocolPolicy,
        cache_policy_id: impl Into<String>,
    ) -> Self {
        Self {
            path_pattern: path_pattern.into(),
            target_origin_id: target_origin_id.into(),
            viewer_protocol_policy,
            allowed_methods: AllowedMethods::read_only(),
            cache_policy_id: Some(cache_policy_id.into()),
            compress: true,
            field_level_encryption_id: String::new(),
            function_associations: ItemList::empty(),
            lambda_function_associations: ItemList::empty(),
            origin_request_policy_id: None,
            realtime_log_config_arn: None,
            response_headers_policy_id: None,
            smooth_streaming: false,
            trusted_key_groups: TrustedAccess::default(),
            trusted_signers: TrustedAccess::default(),
            other: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllowedMethods {
    #[serde(flatten)]
    pub methods: ItemList<HttpMethod>,
    pub cached_methods: ItemList<HttpMethod>,
}

impl AllowedMethods {
    /// `HEAD, GET, OPTIONS`, caching `HEAD, GET`.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            methods: ItemList::from_items(vec![HttpMethod::Head, HttpMethod::Get, HttpMethod::Options]),
            cached_methods: ItemList::from_items(vec![HttpMethod::Head, HttpMethod::Get]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionAssociation {
    #[serde(rename = "FunctionARN")]
    pub function_arn: String,
    pub event_type: EventType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LambdaFunctionAssociation {
    #[serde(rename = "LambdaFunctionARN")]
    pub lambda_function_arn: String,
    pub event_type: EventType,
    #[serde(default)]
    pub include_body: bool,
}

/// Trusted signers or trusted key groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrustedAccess {
    pub enabled: bool,
    #[serde(flatten)]
    pub members: ItemList<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerProtocolPolicy {
    AllowAll,
    HttpsOnly,
    RedirectToHttps,
}

impl fmt::Display for ViewerProtocolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllowAll => write!(f, "allow-all"),
            Self::HttpsOnly => write!(f, "https-only"),
            Self::RedirectToHttps => write!(f, "redirect-to-https"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Options,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Trigger point for an edge function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    ViewerRequest,
    ViewerResponse,
    OriginRequest,
    OriginResponse,
}
