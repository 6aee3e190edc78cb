use reqwest::header::{HeaderMap, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::auth::Authorizer;
use super::common::QueryParams;
use super::error::ApiError;
use super::response::Response;

const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";

/// Azure Resource Manager API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    authorizer: Arc<dyn Authorizer>,
    options: ClientOptions,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl RetryConfig {
    /// Exponential backoff before retry number `attempt` (1-based), capped
    /// at `max_backoff_ms`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u64
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u64::MAX);
        Duration::from_millis(std::cmp::min(
            self.initial_backoff_ms.saturating_mul(factor),
            self.max_backoff_ms,
        ))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 30000,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub retry: RetryConfig,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
    /// Interval between polls when Azure doesn't send `Retry-After`.
    pub polling_interval: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: format!("azurerm-rs/{}", env!("CARGO_PKG_VERSION")),
            polling_interval: Duration::from_secs(10),
        }
    }
}

/// One page of a Resource Manager list operation.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "nextLink", default)]
    next_link: Option<String>,
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(endpoint: &str, authorizer: Arc<dyn Authorizer>) -> Result<Self, ApiError> {
        Self::with_options(endpoint, authorizer, ClientOptions::default())
    }

    /// Create a new API client with custom options
    pub fn with_options(
        endpoint: &str,
        authorizer: Arc<dyn Authorizer>,
        options: ClientOptions,
    ) -> Result<Self, ApiError> {
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ApiError::InvalidUrl(endpoint.to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.retry.timeout_seconds))
            .connect_timeout(options.connect_timeout)
            .pool_idle_timeout(options.pool_idle_timeout)
            .pool_max_idle_per_host(options.pool_max_idle_per_host)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: endpoint.trim_end_matches('/').to_string(),
                authorizer,
                options,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn polling_interval(&self) -> Duration {
        self.inner.options.polling_interval
    }

    fn url_for(&self, path: &str, api_version: &str, params: &QueryParams) -> String {
        let params = params.clone().add("api-version", api_version);
        format!("{}{}{}", self.inner.base_url, path, params.to_query_string())
    }

    /// Execute a GET request
    pub async fn get(&self, path: &str, api_version: &str) -> Result<Response, ApiError> {
        self.get_with_params(path, api_version, &QueryParams::new())
            .await
    }

    /// Execute a GET request with extra query parameters
    pub async fn get_with_params(
        &self,
        path: &str,
        api_version: &str,
        params: &QueryParams,
    ) -> Result<Response, ApiError> {
        let url = self.url_for(path, api_version, params);
        self.execute_with_retry(Method::GET, &url, None).await
    }

    /// Execute a GET against an absolute URL, such as a polling endpoint
    pub async fn get_url(&self, url: &str) -> Result<Response, ApiError> {
        let url = url::Url::parse(url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e)))?;
        self.execute_with_retry(Method::GET, url.as_str(), None).await
    }

    /// Execute a PUT request
    pub async fn put<B: Serialize>(
        &self,
        path: &str,
        api_version: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.url_for(path, api_version, &QueryParams::new());
        let body = encode_body(body)?;
        self.execute_with_retry(Method::PUT, &url, Some(&body)).await
    }

    /// Execute a PATCH request
    pub async fn patch<B: Serialize>(
        &self,
        path: &str,
        api_version: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.url_for(path, api_version, &QueryParams::new());
        let body = encode_body(body)?;
        self.execute_with_retry(Method::PATCH, &url, Some(&body)).await
    }

    /// Execute a POST request, optionally with a body
    pub async fn post<B: Serialize>(
        &self,
        path: &str,
        api_version: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.url_for(path, api_version, &QueryParams::new());
        let body = body.map(encode_body).transpose()?;
        self.execute_with_retry(Method::POST, &url, body.as_ref())
            .await
    }

    /// Execute a DELETE request
    pub async fn delete(&self, path: &str, api_version: &str) -> Result<Response, ApiError> {
        let url = self.url_for(path, api_version, &QueryParams::new());
        self.execute_with_retry(Method::DELETE, &url, None).await
    }

    /// Collects every item of a list operation, following `nextLink`.
    pub async fn list_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        api_version: &str,
        params: &QueryParams,
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut response = self
            .get_with_params(path, api_version, params)
            .await?
            .ensure_status(&[200])?;

        loop {
            let page: Page<T> = response.model()?;
            items.extend(page.value);

            match page.next_link.filter(|link| !link.is_empty()) {
                Some(next) => {
                    tracing::debug!("Following nextLink {}", next);
                    response = self.get_url(&next).await?.ensure_status(&[200])?;
                }
                None => break,
            }
        }

        Ok(items)
    }

    /// Execute request with retry logic. Responses are returned as-is for
    /// any status other than 401, 429 and 5xx; callers decide what a 4xx means.
    async fn execute_with_retry(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let retry = &self.inner.options.retry;
        let mut attempt = 0;
        let mut wait: Option<Duration> = None;

        loop {
            if let Some(delay) = wait.take() {
                tracing::debug!(
                    "Retrying {} {} after {}ms (attempt {})",
                    method,
                    url,
                    delay.as_millis(),
                    attempt
                );
                tokio::time::sleep(delay).await;
            }

            let token = self.inner.authorizer.token().await?;
            let request_id = uuid::Uuid::new_v4().to_string();
            tracing::debug!("{} request to: {} ({})", method, url, request_id);

            let mut request = self
                .inner
                .http_client
                .request(method.clone(), url)
                .header(AUTHORIZATION, format!("Bearer {}", token.token))
                .header(USER_AGENT, &self.inner.options.user_agent)
                .header(CLIENT_REQUEST_ID, &request_id);
            if let Some(body) = body {
                request = request.json(body);
            }

            let last_error = match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::UNAUTHORIZED {
                        let text = response.text().await.unwrap_or_default();
                        return Err(ApiError::AuthError(text));
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        let retry_after = retry_after(response.headers());
                        let err = if status == StatusCode::TOO_MANY_REQUESTS {
                            ApiError::RateLimited
                        } else {
                            ApiError::ServiceUnavailable(status.as_u16())
                        };
                        wait = retry_after;
                        err
                    } else {
                        let headers = response.headers().clone();
                        let text = response.text().await?;
                        tracing::debug!("API response {} body: {}", status, text);
                        return Ok(Response {
                            method,
                            url: url.to_string(),
                            status,
                            headers,
                            body: text,
                        });
                    }
                }
                Err(e) if e.is_timeout() || e.is_connect() => e.into(),
                Err(e) => return Err(ApiError::RequestError(e)),
            };

            if attempt >= retry.max_retries {
                return Err(last_error);
            }
            attempt += 1;

            if wait.is_none() {
                wait = Some(retry.backoff(attempt));
            }
        }
    }
}

fn encode_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::ParseError(format!("encoding request: {}", e)))
}

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
