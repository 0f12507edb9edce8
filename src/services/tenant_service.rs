use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{Organization, Subscription, UserRecord};

/// Backend lookups the tenancy resolver depends on.
///
/// Implementations report a missing record as [`ApiError::NotFound`]; the
/// resolver decides which failures are fatal.
#[async_trait]
pub trait TenantApi: Send + Sync {
    async fn fetch_organization(&self, organization_id: &str) -> Result<Organization, ApiError>;

    async fn fetch_subscription(&self, organization_id: &str) -> Result<Subscription, ApiError>;
}

/// `TenantApi` over the console backend's REST endpoints
#[derive(Debug, Clone)]
pub struct HttpTenantApi {
    client: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpTenantApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Transport(format!("invalid API base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!("API base URL '{}' cannot carry a path", base_url)));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            bearer_token: None,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let api = Self::new(&config.base_url, Duration::from_secs(config.request_timeout_secs))?;
        Ok(match &config.bearer_token {
            Some(token) => api.with_bearer_token(token.clone()),
            None => api,
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Load the user record behind a signed-in identity
    pub async fn fetch_user_record(&self, uid: &str) -> Result<UserRecord, ApiError> {
        let url = self.endpoint(&["api", "users", uid])?;
        self.get_json(url).await
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("API base URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(%url, "GET");

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| format!("{} returned {}", url.path(), status));
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        let body: Value = response.json().await?;
        serde_json::from_value(unwrap_envelope(body)).map_err(|e| ApiError::Decode(format!("{}: {}", url.path(), e)))
    }
}

#[async_trait]
impl TenantApi for HttpTenantApi {
    async fn fetch_organization(&self, organization_id: &str) -> Result<Organization, ApiError> {
        let url = self.endpoint(&["api", "organizations", organization_id])?;
        self.get_json(url).await
    }

    async fn fetch_subscription(&self, organization_id: &str) -> Result<Subscription, ApiError> {
        let url = self.endpoint(&["api", "organizations", organization_id, "subscription"])?;
        self.get_json(url).await
    }
}

/// Accept both bare payloads and `{ "success": true, "data": ... }` envelopes
fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("success") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Pull a readable message out of an error body
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => ["error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}
