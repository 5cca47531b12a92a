//! Shared JSON-over-HTTP client for the collaborator adapters.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("invalid response from {endpoint}: {message}")]
    Body { endpoint: String, message: String },
}

impl HttpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Transport { source, .. } if source.is_timeout())
    }
}

/// Longest error body kept in [`HttpError::Status`].
const ERROR_BODY_MAX: usize = 500;

/// Client bound to one collaborator base URL.
#[derive(Clone)]
pub struct JsonClient {
    client: reqwest::Client,
    base_url: String,
}

impl JsonClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(HttpError::Build)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// POST a JSON body; an empty response body reads as `null`.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, HttpError> {
        let endpoint = self.endpoint(path);
        debug!("POST {}", endpoint);
        let request = self.client.post(&endpoint).json(body);
        self.send(endpoint, request).await
    }

    pub async fn get(&self, path: &str) -> Result<Value, HttpError> {
        let endpoint = self.endpoint(path);
        debug!("GET {}", endpoint);
        let request = self.client.get(&endpoint);
        self.send(endpoint, request).await
    }

    async fn send(&self, endpoint: String, request: reqwest::RequestBuilder) -> Result<Value, HttpError> {
        let response = match request.send().await {
            Ok(r) => r,
            Err(source) => return Err(HttpError::Transport { endpoint, source }),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(source) => return Err(HttpError::Transport { endpoint, source }),
        };

        if !status.is_success() {
            return Err(HttpError::Status {
                endpoint,
                status: status.as_u16(),
                body: scout_domain::truncate(&text, ERROR_BODY_MAX),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| HttpError::Body {
            endpoint,
            message: e.to_string(),
        })
    }
}

pub fn encode_png(png: &[u8]) -> String {
    STANDARD.encode(png)
}

/// Decode a base64 screenshot, tolerating a `data:image/png;base64,` prefix.
pub fn decode_png(data: &str) -> Result<Vec<u8>, String> {
    let raw = match data.split_once("base64,") {
        Some((_, payload)) => payload,
        None => data,
    };
    STANDARD.decode(raw.trim()).map_err(|e| e.to_string())
}
