//! Backend REST Client
//!
//! HTTP client for the hosted backend's REST and auth endpoints.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::error::{BackendError, BackendResult};
use super::query::Select;
use crate::config::{BackendConfig, BackendCredentials};

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Configured handle to the hosted backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    credentials: BackendCredentials,
    /// Session token; requests fall back to the anonymous key without one
    access_token: Option<String>,
    request_timeout_ms: u64,
}

/// The user behind a session token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl BackendClient {
    /// Create a client with the default request timeout
    pub fn new(credentials: BackendCredentials) -> BackendResult<Self> {
        Self::with_request_timeout(credentials, DEFAULT_REQUEST_TIMEOUT_MS)
    }

    pub fn with_request_timeout(
        credentials: BackendCredentials,
        request_timeout_ms: u64,
    ) -> BackendResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(request_timeout_ms))
            .build()?;

        tracing::debug!(url = %credentials.url, "Backend client constructed");

        Ok(Self {
            http,
            credentials,
            access_token: None,
            request_timeout_ms,
        })
    }

    /// Construct from the environment; fails fast if either credential is absent
    pub fn from_env() -> BackendResult<Self> {
        Self::new(BackendCredentials::from_env()?)
    }

    pub fn from_config(config: &BackendConfig) -> BackendResult<Self> {
        Self::with_request_timeout(config.credentials()?, config.request_timeout_ms)
    }

    /// Attach a session token to every subsequent request
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn credentials(&self) -> &BackendCredentials {
        &self.credentials
    }

    /// Full URL for a read query
    pub fn rest_url(&self, select: &Select) -> String {
        format!(
            "{}/rest/v1/{}?{}",
            self.credentials.url,
            select.table(),
            select.to_query_string()
        )
    }

    fn authorize(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header("apikey", &self.credentials.anon_key)
            .header("Authorization", format!("Bearer {}", token))
    }

    fn bearer(&self) -> &str {
        self.access_token
            .as_deref()
            .unwrap_or(&self.credentials.anon_key)
    }

    /// Run a read query and decode every row
    pub async fn fetch<T: DeserializeOwned>(&self, select: &Select) -> BackendResult<Vec<T>> {
        let url = self.rest_url(select);
        tracing::debug!(table = %select.table(), "Backend read");

        let response = self
            .authorize(self.http.get(&url), self.bearer())
            .send()
            .await
            .map_err(|e| BackendError::from_transport(e, select.table(), self.request_timeout_ms))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::from_transport(e, select.table(), self.request_timeout_ms))?;

        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        let rows: Vec<T> = serde_json::from_str(&text)?;
        tracing::debug!(table = %select.table(), rows = rows.len(), "Backend read complete");
        Ok(rows)
    }

    /// Fetch at most one row
    pub async fn fetch_optional<T: DeserializeOwned>(&self, select: Select) -> BackendResult<Option<T>> {
        let rows = self.fetch(&select.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Look up the user behind a session token.
    ///
    /// Returns `None` when the auth service rejects the token.
    pub async fn get_user(&self, access_token: &str) -> BackendResult<Option<AuthUser>> {
        let url = format!("{}/auth/v1/user", self.credentials.url);

        let response = self
            .authorize(self.http.get(&url), access_token)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(e, "auth user", self.request_timeout_ms))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::debug!(status = status.as_u16(), "Session token rejected");
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::from_transport(e, "auth user", self.request_timeout_ms))?;

        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        Ok(Some(serde_json::from_str(&text)?))
    }
}

fn api_error(status: StatusCode, text: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorBody>(text)
        .ok()
        .and_then(|body| body.message.or(body.msg))
        .unwrap_or_else(|| text.to_string());

    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}
