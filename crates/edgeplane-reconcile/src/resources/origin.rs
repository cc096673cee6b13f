use edgeplane_storage::{
    CustomOriginConfig, DistributionConfig, ItemList, Origin, OriginCustomHeader,
    OriginProtocolPolicy, OriginShield, S3OriginConfig, SslProtocol,
};
use serde::{Deserialize, Serialize};

use super::require;
use crate::cascade::cascade_delete_origin;
use crate::error::ReconcileError;
use crate::identity::{MissingEntryPolicy, ResourceKind, SubResource};

/// Prefix the store expects on S3 origin access identities.
pub const S3_ACCESS_IDENTITY_PREFIX: &str = "origin-access-identity/cloudfront/";

/// A declared origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginResource {
    pub distribution_id: String,
    pub origin_id: String,
    pub origin_domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_headers: Vec<CustomHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_origin_config: Option<S3OriginSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_origin_config: Option<CustomOriginSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_shield: Option<OriginShieldSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_access_control_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3OriginSettings {
    pub origin_access_identity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomOriginSettings {
    pub http_port: u16,
    pub https_port: u16,
    pub origin_protocol_policy: OriginProtocolPolicy,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub origin_ssl_protocols: Vec<SslProtocol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_read_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_keep_alive_timeout: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginShieldSettings {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_shield_region: Option<String>,
}

impl OriginResource {
    pub fn new(
        distribution_id: impl Into<String>,
        origin_id: impl Into<String>,
        origin_domain: impl Into<String>,
    ) -> Self {
        Self {
            distribution_id: distribution_id.into(),
            origin_id: origin_id.into(),
            origin_domain: origin_domain.into(),
            origin_path: None,
            custom_headers: Vec::new(),
            s3_origin_config: None,
            custom_origin_config: None,
            connection_attempts: None,
            connection_timeout: None,
            origin_shield: None,
            origin_access_control_id: None,
        }
    }

    fn custom_origin(&self) -> Option<CustomOriginConfig> {
        let custom = self.custom_origin_config.as_ref()?;
        let origin_ssl_protocols = if custom.origin_ssl_protocols.is_empty() {
            None
        } else {
            Some(ItemList::from_items(custom.origin_ssl_protocols.clone()))
        };
        Some(CustomOriginConfig {
            http_port: custom.http_port,
            https_port: custom.https_port,
            origin_protocol_policy: custom.origin_protocol_policy,
            origin_ssl_protocols,
            origin_read_timeout: custom.origin_read_timeout,
            origin_keepalive_timeout: custom.origin_keep_alive_timeout,
            other: Default::default(),
        })
    }
}

fn access_identity_path(identity: &str) -> String {
    if identity.is_empty() || identity.starts_with(S3_ACCESS_IDENTITY_PREFIX) {
        identity.to_string()
    } else {
        format!("{S3_ACCESS_IDENTITY_PREFIX}{identity}")
    }
}

impl SubResource for OriginResource {
    type Entry = Origin;
    type Key = String;

    const KIND: ResourceKind = ResourceKind::Origin;
    const MISSING_ON_DELETE: MissingEntryPolicy = MissingEntryPolicy::Fatal;

    fn distribution_id(&self) -> &str {
        &self.distribution_id
    }

    fn key(&self) -> String {
        self.origin_id.clone()
    }

    fn matches(entry: &Origin, key: &String) -> bool {
        entry.id == *key
    }

    fn to_entry(&self) -> Result<Origin, ReconcileError> {
        require(Self::KIND, "distribution_id", &self.distribution_id)?;
        require(Self::KIND, "origin_id", &self.origin_id)?;
        require(Self::KIND, "origin_domain", &self.origin_domain)?;
        if self.s3_origin_config.is_some() && self.custom_origin_config.is_some() {
            return Err(ReconcileError::invalid_resource(
                Self::KIND,
                "s3_origin_config and custom_origin_config are mutually exclusive",
            ));
        }

        let custom_headers = self
            .custom_headers
            .iter()
            .map(|h| OriginCustomHeader {
                header_name: h.name.clone(),
                header_value: h.value.clone(),
            })
            .collect();

        let origin_shield = match &self.origin_shield {
            Some(shield) => OriginShield {
                enabled: shield.enabled,
                origin_shield_region: shield.origin_shield_region.clone(),
                other: Default::default(),
            },
            None => OriginShield {
                enabled: false,
                origin_shield_region: None,
                other: Default::default(),
            },
        };

        Ok(Origin {
            id: self.origin_id.clone(),
            domain_name: self.origin_domain.clone(),
            origin_path: self.origin_path.clone().unwrap_or_default(),
            custom_headers: ItemList::from_items(custom_headers),
            s3_origin_config: self.s3_origin_config.as_ref().map(|s3| S3OriginConfig {
                origin_access_identity: access_identity_path(&s3.origin_access_identity),
                other: Default::default(),
            }),
            custom_origin_config: self.custom_origin(),
            connection_attempts: self.connection_attempts,
            connection_timeout: self.connection_timeout,
            origin_shield: Some(origin_shield),
            origin_access_control_id: self.origin_access_control_id.clone(),
            other: Default::default(),
        })
    }

    fn collection(config: &DistributionConfig) -> &ItemList<Origin> {
        &config.origins
    }

    fn collection_mut(config: &mut DistributionConfig) -> &mut ItemList<Origin> {
        &mut config.origins
    }

    fn detach(config: &mut DistributionConfig, index: usize) -> Vec<String> {
        let origin_id = config.origins.items[index].id.clone();
        cascade_delete_origin(config, &origin_id)
            .map(|report| {
                report
                    .removed_behaviours
                    .iter()
                    .map(|b| format!("{}:{}", b.target_origin_id, b.path_pattern))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults_resolved() {
        let origin = OriginResource::new("d1", "o1", "bucket.s3.amazonaws.com")
            .to_entry()
            .unwrap();
        assert_eq!(origin.origin_path, "");
        assert_eq!(origin.custom_headers.quantity, 0);
        assert_eq!(
            origin.origin_shield,
            Some(OriginShield {
                enabled: false,
                origin_shield_region: None,
                other: Default::default(),
            })
        );
        assert!(origin.s3_origin_config.is_none());
    }

    #[test]
    fn test_s3_identity_is_prefixed_once() {
        let mut declared = OriginResource::new("d1", "o1", "bucket.s3.amazonaws.com");
        declared.s3_origin_config = Some(S3OriginSettings {
            origin_access_identity: "E74FTE3AEXAMPLE".into(),
        });
        let origin = declared.to_entry().unwrap();
        assert_eq!(
            origin.s3_origin_config.unwrap().origin_access_identity,
            "origin-access-identity/cloudfront/E74FTE3AEXAMPLE"
        );

        declared.s3_origin_config = Some(S3OriginSettings {
            origin_access_identity: "origin-access-identity/cloudfront/E74FTE3AEXAMPLE".into(),
        });
        let origin = declared.to_entry().unwrap();
        assert_eq!(
            origin.s3_origin_config.unwrap().origin_access_identity,
            "origin-access-identity/cloudfront/E74FTE3AEXAMPLE"
        );
    }

    #[test]
    fn test_origin_variants_are_exclusive() {
        let mut declared = OriginResource::new("d1", "o1", "a.example");
        declared.s3_origin_config = Some(S3OriginSettings {
            origin_access_identity: String::new(),
        });
        declared.custom_origin_config = Some(CustomOriginSettings {
            http_port: 80,
            https_port: 443,
            origin_protocol_policy: OriginProtocolPolicy::HttpsOnly,
            origin_ssl_protocols: vec![],
            origin_read_timeout: None,
            origin_keep_alive_timeout: None,
        });

        let err = declared.to_entry().unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidResource { .. }));
    }

    #[test]
    fn test_required_fields() {
        let err = OriginResource::new("d1", "", "a.example").to_entry().unwrap_err();
        assert_eq!(err.to_string(), "invalid origin: origin_id must not be empty");
    }

    #[test]
    fn test_declared_from_json() {
        let declared: OriginResource = serde_json::from_value(json!({
            "distribution_id": "d1",
            "origin_id": "api",
            "origin_domain": "api.example.com",
            "origin_path": "/v1",
            "custom_headers": [{"name": "X-Origin-Token", "value": "s3cr3t"}],
            "custom_origin_config": {
                "http_port": 80,
                "https_port": 443,
                "origin_protocol_policy": "https-only",
                "origin_ssl_protocols": ["TLSv1.2"],
                "origin_keep_alive_timeout": 5
            },
            "connection_attempts": 3,
            "origin_shield": {"enabled": true, "origin_shield_region": "eu-west-1"}
        }))
        .unwrap();

        let origin = declared.to_entry().unwrap();
        assert_eq!(origin.origin_path, "/v1");
        assert_eq!(origin.custom_headers.items[0].header_name, "X-Origin-Token");
        let custom = origin.custom_origin_config.unwrap();
        assert_eq!(custom.origin_ssl_protocols.unwrap().quantity, 1);
        assert_eq!(custom.origin_keepalive_timeout, Some(5));
        assert_eq!(origin.connection_attempts, Some(3));
        assert!(origin.origin_shield.unwrap().enabled);
    }
}
