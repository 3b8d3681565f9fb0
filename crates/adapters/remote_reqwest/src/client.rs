//! Shared gateway client: one `reqwest::Client`, one base URL.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use homectl_domain::error::RemoteError;

/// Connection settings for the API gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Per-request timeout applied by reqwest itself.
    pub timeout: Duration,
}

/// Successful responses wrap their payload in `{"data": ...}`.
#[derive(serde::Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// HTTP client bound to the API gateway.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// Build a client from the gateway settings.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Transport`] when the TLS backend cannot be
    /// initialised.
    pub fn new(config: &GatewayConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("homectld/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| RemoteError::Transport {
                target: config.base_url.clone(),
                source: Box::new(err),
            })?;
        Ok(Self::from_reqwest(&config.base_url, http))
    }

    /// Wrap an existing `reqwest::Client`.
    #[must_use]
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Join `path` (without a leading slash) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// GET a `{"data": ...}` envelope and unwrap it.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        target: &str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let envelope: Envelope<T> = self.get_raw(target, path, params).await?;
        Ok(envelope.data)
    }

    /// GET a body that is decoded as is.
    pub(crate) async fn get_raw<T: DeserializeOwned>(
        &self,
        target: &str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let resp = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|err| transport(target, err))?;
        handle_response(target, resp).await
    }

    pub(crate) async fn patch<B: Serialize + Sync>(
        &self,
        target: &str,
        path: &str,
        body: &B,
    ) -> Result<(), RemoteError> {
        let url = self.url(path);
        tracing::debug!(%url, "PATCH");

        let resp = self
            .http
            .patch(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| transport(target, err))?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(parse_error(target, status, resp).await)
        }
    }
}

async fn handle_response<T: DeserializeOwned>(
    target: &str,
    resp: reqwest::Response,
) -> Result<T, RemoteError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(parse_error(target, status, resp).await);
    }
    let body = resp.bytes().await.map_err(|err| transport(target, err))?;
    serde_json::from_slice(&body).map_err(|err| RemoteError::Decode {
        target: target.to_string(),
        source: Box::new(err),
    })
}

async fn parse_error(
    target: &str,
    status: reqwest::StatusCode,
    resp: reqwest::Response,
) -> RemoteError {
    let raw = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&raw) {
        Ok(ErrorResponse {
            message: Some(message),
        }) => message,
        _ if raw.is_empty() => status.to_string(),
        _ => raw,
    };
    RemoteError::Status {
        target: target.to_string(),
        status: status.as_u16(),
        message,
    }
}

fn transport(target: &str, err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout {
            target: target.to_string(),
        }
    } else {
        RemoteError::Transport {
            target: target.to_string(),
            source: Box::new(err),
        }
    }
}
