//! Bearer token acquisition for Resource Manager requests

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::environment::Environment;
use crate::error::ApiError;

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_on {
            Some(expires_on) => now + ChronoDuration::seconds(EXPIRY_MARGIN_SECS) < expires_on,
            None => true,
        }
    }
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn token(&self) -> Result<AccessToken, ApiError>;
}

/// Authorizer returning a pre-issued token, e.g. from `ARM_ACCESS_TOKEN`.
pub struct StaticTokenAuthorizer {
    token: String,
}

impl StaticTokenAuthorizer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl Authorizer for StaticTokenAuthorizer {
    async fn token(&self) -> Result<AccessToken, ApiError> {
        Ok(AccessToken {
            token: self.token.clone(),
            expires_on: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Service principal authentication using the OAuth2 client credentials grant.
pub struct ClientSecretAuthorizer {
    http: reqwest::Client,
    token_url: String,
    scope: String,
    client_id: String,
    client_secret: String,
    cached: RwLock<Option<AccessToken>>,
}

impl ClientSecretAuthorizer {
    pub fn new(
        environment: &Environment,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                environment.login_endpoint.trim_end_matches('/'),
                tenant_id
            ),
            scope: environment.token_scope(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            cached: RwLock::new(None),
        })
    }

    async fn acquire(&self) -> Result<AccessToken, ApiError> {
        tracing::debug!("Acquiring access token from {}", self.token_url);

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self.http.post(&self.token_url).form(&form).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::AuthError(format!(
                "token endpoint returned {}: {}",
                status, text
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::ParseError(format!("token response: {}", e)))?;

        Ok(AccessToken {
            token: parsed.access_token,
            expires_on: parsed
                .expires_in
                .map(|secs| Utc::now() + ChronoDuration::seconds(secs)),
        })
    }
}

#[async_trait]
impl Authorizer for ClientSecretAuthorizer {
    async fn token(&self) -> Result<AccessToken, ApiError> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.clone());
            }
        }

        let token = self.acquire().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}
