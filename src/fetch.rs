//! Remote fetch adapter.
//!
//! A [`Fetcher`] performs one JSON request and returns either the parsed
//! body or a [`FetchError`]. Transport failures, error statuses and
//! undecodable bodies all come back as `FetchError`; nothing escapes the
//! boundary as a panic or an untyped error.
//!
//! [`HttpFetcher`] is the `reqwest` implementation used by the CLI. Tests
//! substitute their own `Fetcher` to script responses.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::config::HttpConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A fully resolved request: method, absolute URL and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// No response was received.
    #[error("{message}")]
    Transport { message: String },
    /// A success response whose body is not JSON or has the wrong shape.
    #[error("{message}")]
    Decode { message: String },
    /// A well-formed response that lacks the requested entity.
    #[error("{message}")]
    Missing { message: String },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FetchError::Status { message, .. }
            | FetchError::Transport { message }
            | FetchError::Decode { message }
            | FetchError::Missing { message } => message,
        }
    }

    /// Build the error for a non-success response.
    ///
    /// The message is the status reason, followed by `: {message}` when the
    /// body carries a `message` field.
    pub fn from_status(status: u16, body: Option<&Value>) -> Self {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));

        let detail = body
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty());

        let message = match detail {
            Some(detail) => format!("{}: {}", reason, detail),
            None => reason,
        };
        FetchError::Status { status, message }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: Request) -> Result<Value, FetchError>;
}

/// Prefix `http://` when `url` carries no scheme, so bare logical service
/// names resolve as hostnames.
pub fn absolute_url(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: Request) -> Result<Value, FetchError> {
        let url = absolute_url(&request.url);
        tracing::debug!(method = %request.method, url = %url, "fetch");

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| FetchError::Transport {
            message: e.to_string(),
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| FetchError::Transport {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let body = serde_json::from_str::<Value>(&text).ok();
            return Err(FetchError::from_status(status.as_u16(), body.as_ref()));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| FetchError::Decode {
            message: format!("invalid JSON from {}: {}", url, e),
        })
    }
}
