//! HTTPS client for the PingDirectory configuration API (reqwest-based).

use crate::client::{ConfigApi, ObjectPath};
use crate::config::ProviderConfig;
use crate::error::{ApiError, ApiResult};
use crate::operations::UpdateRequest;
use log::{debug, trace};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use std::fmt;

const USER_AGENT: &str = concat!("pingdirectory-provider/", env!("CARGO_PKG_VERSION"));

/// Configuration API client authenticating with HTTP basic auth.
#[derive(Clone)]
pub struct HttpConfigClient {
    /// Base URL including `/config/v1`
    base_url: Url,
    username: String,
    password: String,
    http_client: Client,
}

impl fmt::Debug for HttpConfigClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConfigClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl HttpConfigClient {
    /// Build a client from validated provider configuration.
    pub fn new(config: &ProviderConfig) -> ApiResult<Self> {
        let mut builder = Client::builder()
            .danger_accept_invalid_certs(config.insecure_trust_all_tls)
            .user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Self::with_http_client(
            &config.https_host,
            config.username.clone(),
            config.password.clone(),
            http_client,
        )
    }

    /// Create a client with a pre-built `reqwest::Client` against any host.
    pub fn with_http_client(
        host: &str,
        username: impl Into<String>,
        password: impl Into<String>,
        http_client: Client,
    ) -> ApiResult<Self> {
        let mut base_url = Url::parse(host)
            .map_err(|e| ApiError::invalid_request(format!("Invalid host URL '{}': {}", host, e)))?;
        base_url
            .path_segments_mut()
            .map_err(|_| {
                ApiError::invalid_request(format!("Host URL '{}' cannot be a base", host))
            })?
            .pop_if_empty()
            .extend(["config", "v1"]);

        Ok(Self {
            base_url,
            username: username.into(),
            password: password.into(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, segments: &[String]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::invalid_request("Base URL cannot be a base"))?
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
    }

    async fn handle_response(response: Response) -> ApiResult<Value> {
        let status = response.status();
        let body = response.text().await?;
        trace!("Configuration API response {}: {}", status, body);

        if !status.is_success() {
            return Err(ApiError::http(status.as_u16(), body));
        }
        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl ConfigApi for HttpConfigClient {
    async fn add(&self, path: &ObjectPath, body: Value) -> ApiResult<Value> {
        let url = self.url(path.collection_segments())?;
        debug!("POST {}", url);
        let response = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn get(&self, path: &ObjectPath) -> ApiResult<Value> {
        let url = self.url(&path.segments())?;
        debug!("GET {}", url);
        let response = self.request(Method::GET, url).send().await?;
        Self::handle_response(response).await
    }

    async fn update(&self, path: &ObjectPath, request: &UpdateRequest) -> ApiResult<Value> {
        let url = self.url(&path.segments())?;
        debug!("PATCH {} ({} operations)", url, request.operations.len());
        let response = self
            .request(Method::PATCH, url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn delete(&self, path: &ObjectPath) -> ApiResult<()> {
        let url = self.url(&path.segments())?;
        debug!("DELETE {}", url);
        let response = self.request(Method::DELETE, url).send().await?;
        Self::handle_response(response).await.map(|_| ())
    }
}
