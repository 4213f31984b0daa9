use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::FetchError;
use crate::query::QueryParams;
use crate::resource::ResourceKind;

pub trait RecordService: Send + Sync {
    fn list_records(
        &self,
        kind: ResourceKind,
        query: &QueryParams,
    ) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Reads the token from an environment variable on every request, so a
/// refreshed token is picked up without rebuilding the service.
#[derive(Clone, Debug)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Clone, Debug)]
pub struct ServiceOptions {
    pub base_url: String,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api/".to_string(),
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

#[derive(Clone)]
pub struct HttpRecordService {
    client: reqwest::Client,
    base_url: reqwest::Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpRecordService {
    pub fn new(
        options: &ServiceOptions,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, FetchError> {
        let base_url = parse_base_url(&options.base_url)?;
        let client = build_client(options.proxy.as_deref(), options.timeout_seconds)?;
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn endpoint_url(
        &self,
        kind: ResourceKind,
        query: &QueryParams,
    ) -> Result<reqwest::Url, FetchError> {
        let mut url = self
            .base_url
            .join(kind.endpoint())
            .map_err(|e| FetchError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                message: e.to_string(),
            })?;
        query.apply_to(&mut url);
        Ok(url)
    }
}

impl RecordService for HttpRecordService {
    async fn list_records(
        &self,
        kind: ResourceKind,
        query: &QueryParams,
    ) -> Result<Value, FetchError> {
        let url = self.endpoint_url(kind, query)?;
        log::debug!("GET {url}");

        let mut builder = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.credentials.bearer_token() {
            builder = builder.bearer_auth(token);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| FetchError::Transport { source: e })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Transport { source: e })?;
        serde_json::from_slice::<Value>(&body).map_err(|e| FetchError::Decode { source: e })
    }
}

// `Url::join` drops the last path segment unless the base ends with '/'
fn parse_base_url(raw: &str) -> Result<reqwest::Url, FetchError> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    reqwest::Url::parse(&raw).map_err(|e| FetchError::InvalidBaseUrl {
        url: raw.clone(),
        message: e.to_string(),
    })
}

fn build_client(
    proxy: Option<&str>,
    timeout_seconds: usize,
) -> Result<reqwest::Client, FetchError> {
    let agent = concat!("listwise/", env!("CARGO_PKG_VERSION"));
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(agent),
    );

    let timeout = Duration::from_secs(timeout_seconds.try_into().unwrap_or(10));
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout);

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| FetchError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| FetchError::HttpClientBuild { source: e })
}
