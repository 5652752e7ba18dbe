//! Authenticated API client
//!
//! Wraps every outbound call with:
//! - Bearer token injection from the session
//! - A single transparent retry after refreshing an expired access token
//! - Error classification (HTTP status vs transport failure)

use crate::auth::{Authenticator, TokenRefresher};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::SessionContext;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Retries allowed per request after a `401`
pub const MAX_AUTH_RETRIES: u32 = 1;

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Outbound request captured so it can be reissued after a refresh
///
/// Immutable: a retry is a new descriptor with the attempt count bumped.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<Value>,
    timeout: Duration,
    attempt: u32,
}

impl PendingRequest {
    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Fully resolved URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers sent with every attempt (the bearer token is added per attempt)
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// JSON body, if any
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// 0 for the original send, 1 for the post-refresh retry
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether the auth retry budget is spent
    pub fn is_retry(&self) -> bool {
        self.attempt >= MAX_AUTH_RETRIES
    }

    /// Descriptor for the next attempt
    #[must_use]
    pub fn retry(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }

    fn to_builder(&self, client: &Client, token: Option<&str>) -> Result<RequestBuilder> {
        let mut headers = self.headers.clone();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                Error::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                    message: e.to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut req = client
            .request(self.method.clone(), &self.url)
            .headers(headers)
            .timeout(self.timeout);

        if !self.query.is_empty() {
            req = req.query(&self.query);
        }

        if let Some(ref body) = self.body {
            req = req.json(body);
        }

        Ok(req)
    }
}

/// HTTP client that authenticates every call against the session
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
    default_headers: HeaderMap,
    authenticator: Authenticator,
}

impl ApiClient {
    /// Create a client over the given session
    pub fn new(config: ClientConfig, session: SessionContext) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Http)?;

        let default_headers = header_map(&config.default_headers)?;
        let session = session.with_entry_route(config.entry_route.clone());
        let refresher = TokenRefresher::with_client(config.refresh_url(), client.clone());
        let authenticator =
            Authenticator::new(session, refresher).with_coalescing(config.coalesce_refresh);

        Ok(Self {
            client,
            config,
            default_headers,
            authenticator,
        })
    }

    /// Create a client from environment config with an in-memory session
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?, SessionContext::in_memory())
    }

    /// The session tokens are read from and written to
    pub fn session(&self) -> &SessionContext {
        self.authenticator.session()
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.request(Method::GET, path, RequestConfig::default())
            .await
    }

    /// Make a GET request with config
    pub async fn get_with_config(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::GET, path, config).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: Value) -> Result<Response> {
        self.request(Method::POST, path, RequestConfig::default().json(body))
            .await
    }

    /// Make a PUT request
    pub async fn put(&self, path: &str, body: Value) -> Result<Response> {
        self.request(Method::PUT, path, RequestConfig::default().json(body))
            .await
    }

    /// Make a PATCH request
    pub async fn patch(&self, path: &str, body: Value) -> Result<Response> {
        self.request(Method::PATCH, path, RequestConfig::default().json(body))
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.request(Method::DELETE, path, RequestConfig::default())
            .await
    }

    /// Make a generic request
    ///
    /// `path` is joined onto the configured base URL. A `401` triggers at
    /// most one refresh-and-retry; every other failure is returned as is.
    pub async fn request(
        &self,
        method: impl Into<Method>,
        path: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let pending = self.prepare(method.into(), path, config)?;
        self.execute(pending).await
    }

    /// Make a request and parse JSON response
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: impl Into<Method>,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let response = self.request(method, path, config).await?;
        let json: T = response.json().await.map_err(Error::Http)?;
        Ok(json)
    }

    /// Make a GET request and parse JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(Method::GET, path, RequestConfig::default())
            .await
    }

    /// Capture the outbound request
    pub fn prepare(&self, method: Method, path: &str, config: RequestConfig) -> Result<PendingRequest> {
        let mut headers = self.default_headers.clone();
        headers.extend(header_map(&config.headers)?);

        let mut query: Vec<(String, String)> = config.query.into_iter().collect();
        query.sort();

        Ok(PendingRequest {
            method,
            url: self.config.resolve(path),
            headers,
            query,
            body: config.body,
            timeout: config.timeout.unwrap_or(self.config.timeout),
            attempt: 0,
        })
    }

    async fn execute(&self, pending: PendingRequest) -> Result<Response> {
        let token = self.authenticator.access_token().await?;
        let response = self.send(&pending, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || pending.is_retry() {
            return check_status(response).await;
        }

        let retry = pending.retry();
        let body = response.text().await.unwrap_or_default();
        warn!(
            method = %pending.method,
            url = %pending.url,
            "Request unauthorized, attempting token refresh"
        );

        let Some(fresh) = self.authenticator.recover(token.as_deref()).await? else {
            return Err(Error::http_status(StatusCode::UNAUTHORIZED.as_u16(), body));
        };

        debug!(attempt = retry.attempt, "Reissuing request with refreshed token");
        let response = self.send(&retry, Some(&fresh)).await?;
        check_status(response).await
    }

    async fn send(&self, pending: &PendingRequest, token: Option<&str>) -> Result<Response> {
        debug!(
            method = %pending.method,
            url = %pending.url,
            attempt = pending.attempt,
            authenticated = token.is_some(),
            "Sending request"
        );
        let req = pending.to_builder(&self.client, token)?;
        req.send().await.map_err(Error::Http)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Pass success through, turn error statuses into `Error::HttpStatus`
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::http_status(status.as_u16(), body));
    }
    Ok(response)
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| Error::InvalidHeader {
            name: key.clone(),
            message: e.to_string(),
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
            name: key.clone(),
            message: e.to_string(),
        })?;
        map.insert(name, value);
    }
    Ok(map)
}
