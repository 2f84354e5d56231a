//! HTTP Transport
//!
//! The raw request/response seam. `ReqwestTransport` talks to the real API;
//! tests swap in scripted transports.

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A replayable API request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, with query string
    pub path: String,
    pub body: Option<Value>,
    /// Set once the request has been replayed after a credential refresh
    pub retry: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            retry: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn post<T: Serialize + ?Sized>(path: impl Into<String>, body: &T) -> DomainResult<Self> {
        Self::new(Method::Post, path).with_json(body)
    }

    pub fn put<T: Serialize + ?Sized>(path: impl Into<String>, body: &T) -> DomainResult<Self> {
        Self::new(Method::Put, path).with_json(body)
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> DomainResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The access token was rejected as expired or invalid
    pub fn is_auth_expired(&self) -> bool {
        self.status == 401
    }

    /// Turn a non-2xx response into an error, keeping the server's message
    pub fn error_for_status(self) -> DomainResult<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let message = self
            .body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {}", self.status));
        Err(DomainError::Api {
            status: self.status,
            message,
        })
    }

    pub fn json<T: DeserializeOwned>(self) -> DomainResult<T> {
        Ok(serde_json::from_value(self.body)?)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`, bearing `token` if given. HTTP error statuses are
    /// returned as responses; only transport failures are errors.
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> DomainResult<ApiResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> DomainResult<Self> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_millis(config.request_timeout_ms));
        let client = builder
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> DomainResult<ApiResponse> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::Transport(format!("request to {} timed out", request.path))
            } else {
                DomainError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(ApiResponse { status, body })
    }
}
