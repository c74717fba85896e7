//! Publish API client implementation.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::error::{ClientError, PublishError, Result};

/// Timeout for health and reinitialize calls.
const SHORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for reinitialize calls (the engine reloads definitions).
const REINIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for publish calls.
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// Receipt returned by a successful publish.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReceipt {
    /// Instance id assigned by the remote engine.
    pub instance_id: String,
}

/// Client for the definition-publishing API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
}

impl ApiClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a URL under `api/<version>/`.
    fn api_url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.base_url
            .join(&format!("api/{}/{}", self.api_version, path))
            .map_err(ClientError::from)
    }

    /// Probe the health endpoint. Any failure is "not reachable".
    pub async fn health(&self) -> bool {
        let Ok(url) = self.base_url.join("health") else {
            return false;
        };
        match self.http.get(url).timeout(SHORT_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Publish a definition payload.
    ///
    /// The payload is sent verbatim; the engine derives everything it needs
    /// from the document itself. A non-success response is converted into a
    /// structured [`PublishError`] carrying the most specific message the
    /// body offers.
    pub async fn publish(&self, payload: &Value) -> Result<PublishReceipt> {
        let url = self.api_url("definitions/publish")?;
        let response = self
            .http
            .post(url)
            .json(payload)
            .timeout(PUBLISH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Publish(extract_publish_error(
                status.as_u16(),
                &body,
            )));
        }

        let body: Value = response.json().await?;
        let instance_id = body
            .get("id")
            .or_else(|| body.get("Id"))
            .and_then(value_as_id)
            .ok_or(ClientError::MissingInstanceId)?;

        tracing::debug!(instance_id = %instance_id, "definition published");
        Ok(PublishReceipt { instance_id })
    }

    /// Ask the engine to reload its definitions.
    ///
    /// Best-effort: the result is a plain bool and a failure here never
    /// fails a batch.
    pub async fn reinitialize(&self) -> bool {
        let Ok(url) = self.api_url("definitions/re-initialize") else {
            return false;
        };
        match self.http.get(url).timeout(REINIT_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "reinitialize call failed");
                false
            }
        }
    }
}

/// Extract the most specific error message from a failed publish body.
///
/// Precedence: plain-string body, `error.message` (keeping `error` as
/// detail), top-level `message`, then the raw body.
pub fn extract_publish_error(status: u16, body: &str) -> PublishError {
    let status = Some(status);

    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        // Not JSON at all; the body text is the message.
        let message = if body.trim().is_empty() {
            format!("HTTP {}", status.unwrap_or(0))
        } else {
            body.trim().to_string()
        };
        return PublishError {
            message,
            detail: None,
            status,
        };
    };

    if let Value::String(s) = &parsed {
        return PublishError {
            message: s.clone(),
            detail: None,
            status,
        };
    }

    if let Some(message) = parsed
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return PublishError {
            message: message.to_string(),
            detail: parsed.get("error").cloned(),
            status,
        };
    }

    if let Some(message) = parsed.get("message").and_then(Value::as_str) {
        return PublishError {
            message: message.to_string(),
            detail: None,
            status,
        };
    }

    PublishError {
        message: parsed.to_string(),
        detail: Some(parsed),
        status,
    }
}

/// Instance ids arrive as strings or numbers depending on engine version.
fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Builder for [`ApiClient`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_version: Option<String>,
}

impl ClientBuilder {
    /// Create a builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API version segment (default `v1`).
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Config("base_url is required".to_string()))?;

        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let http = reqwest::Client::builder()
            .user_agent(format!("flowsync/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ApiClient {
            http,
            base_url,
            api_version: self.api_version.unwrap_or_else(|| "v1".to_string()),
        })
    }
}
