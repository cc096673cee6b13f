use std::time::Duration;

use async_trait::async_trait;
use edgeplane_storage::{
    DistributionConfig, DistributionStore, StoreError, VersionToken, VersionedConfig,
};
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::{Method, Response, StatusCode};
use url::Url;

/// Version reported for a write the store accepted without an `ETag`.
///
/// The next lifecycle call fetches a fresh token before writing again.
pub const UNREPORTED_VERSION: &str = "unreported";

/// Credentials attached to every request.
#[derive(Debug, Clone)]
pub enum AuthHeader {
    Bearer { token: String },
}

/// Distribution store reached over HTTP.
///
/// `GET {base}/distribution/{id}/config` returns the document with its
/// version in the `ETag` header; `PUT` to the same path replaces it when the
/// `If-Match` header still names the current version.
#[derive(Debug, Clone)]
pub struct HttpStore {
    http: reqwest::Client,
    base_url: Url,
    auth: Option<AuthHeader>,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout: Duration, auth: Option<AuthHeader>) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::connection_error(format!("invalid store endpoint {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::connection_error(format!(
                "store endpoint {base_url} cannot be used as a base URL"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::connection_error(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    fn config_url(&self, distribution_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["distribution", distribution_id, "config"]);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, url);
        if let Some(AuthHeader::Bearer { token }) = &self.auth {
            req = req.bearer_auth(token);
        }
        req.header("Accept", "application/json")
    }
}

#[async_trait]
impl DistributionStore for HttpStore {
    async fn fetch(&self, distribution_id: &str) -> Result<VersionedConfig, StoreError> {
        let url = self.config_url(distribution_id);
        tracing::debug!(%url, "fetching distribution config");
        let resp = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(transport_error)?;

        match resp.status() {
            StatusCode::OK => {
                let version = etag(&resp)?;
                let body = resp.text().await.map_err(transport_error)?;
                let config = serde_json::from_str(&body).map_err(|e| {
                    StoreError::invalid_document(format!("failed to parse distribution config: {e}"))
                })?;
                Ok(VersionedConfig { config, version })
            }
            StatusCode::NOT_FOUND => Err(StoreError::not_found(distribution_id)),
            _ => Err(unexpected("GET", resp).await),
        }
    }

    async fn write(
        &self,
        distribution_id: &str,
        config: &DistributionConfig,
        if_match: &VersionToken,
    ) -> Result<VersionToken, StoreError> {
        let url = self.config_url(distribution_id);
        tracing::debug!(%url, if_match = %if_match, "writing distribution config");
        let resp = self
            .request(Method::PUT, url)
            .header(IF_MATCH, if_match.as_str())
            .json(config)
            .send()
            .await
            .map_err(transport_error)?;

        match resp.status() {
            status if status.is_success() => Ok(etag(&resp).unwrap_or_else(|_| {
                tracing::warn!(distribution_id, %status, "write accepted without an ETag");
                VersionToken::new(UNREPORTED_VERSION)
            })),
            StatusCode::PRECONDITION_FAILED | StatusCode::CONFLICT => Err(
                StoreError::version_conflict(distribution_id, if_match.as_str()),
            ),
            StatusCode::NOT_FOUND => Err(StoreError::not_found(distribution_id)),
            _ => Err(unexpected("PUT", resp).await),
        }
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

fn etag(resp: &Response) -> Result<VersionToken, StoreError> {
    resp.headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(VersionToken::from)
        .ok_or_else(|| StoreError::invalid_document("response is missing an ETag header"))
}

fn transport_error(err: reqwest::Error) -> StoreError {
    StoreError::connection_error(format!("failed to reach store: {err}"))
}

async fn unexpected(verb: &str, resp: Response) -> StoreError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    StoreError::connection_error(format!("{verb} failed (HTTP {status}): {body}"))
}
