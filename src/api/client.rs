//! Authenticated API Client
//!
//! Attaches the access token to every request. A request rejected as
//! unauthorized goes through the refresh gate and is replayed exactly once.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::auth::{AuthSession, CredentialRefresher, RefreshGate};
use crate::domain::{DomainError, DomainResult, TokenPair};

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<AuthSession>,
    gate: Arc<RefreshGate>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<AuthSession>, gate: Arc<RefreshGate>) -> Self {
        Self {
            transport,
            session,
            gate,
        }
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    pub fn gate(&self) -> &Arc<RefreshGate> {
        &self.gate
    }

    /// Send without credentials and without refresh handling
    pub async fn send_public(&self, request: ApiRequest) -> DomainResult<ApiResponse> {
        self.transport.send(&request, None).await?.error_for_status()
    }

    /// Send with an explicit token, bypassing the session
    pub async fn send_with_token(&self, request: ApiRequest, token: &str) -> DomainResult<ApiResponse> {
        self.transport.send(&request, Some(token)).await?.error_for_status()
    }

    /// Send with the session's credentials, recovering once from an
    /// expired token
    pub async fn execute(&self, mut request: ApiRequest) -> DomainResult<ApiResponse> {
        let sent_with = self.session.access_token().await;
        let response = self.transport.send(&request, sent_with.as_deref()).await?;
        if !response.is_auth_expired() {
            return response.error_for_status();
        }
        if request.retry {
            return Err(DomainError::RetryExhausted(request.path));
        }
        request.retry = true;

        // A refresh may have completed while this request was on the wire.
        let current = self.session.access_token().await;
        let token = match current {
            Some(token) if sent_with.as_deref() != Some(token.as_str()) => {
                debug!(path = %request.path, "retrying with credential refreshed meanwhile");
                token
            }
            _ => self.gate.recover().await?,
        };

        let retried = self.transport.send(&request, Some(&token)).await?;
        if retried.is_auth_expired() {
            warn!(path = %request.path, "still unauthorized after credential refresh");
            return Err(DomainError::RetryExhausted(request.path));
        }
        retried.error_for_status()
    }

    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> DomainResult<T> {
        self.execute(request).await?.json()
    }

    pub async fn execute_unit(&self, request: ApiRequest) -> DomainResult<()> {
        self.execute(request).await.map(|_| ())
    }
}

/// Refresh call against `POST /refresh`. Goes straight to the transport so
/// it can never re-enter the gate.
pub struct HttpCredentialRefresher {
    transport: Arc<dyn Transport>,
}

impl HttpCredentialRefresher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[derive(serde::Serialize)]
struct RefreshArgs<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

#[async_trait]
impl CredentialRefresher for HttpCredentialRefresher {
    async fn refresh_credential(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let request = ApiRequest::post("/refresh", &RefreshArgs { refresh_token })?;
        self.transport.send(&request, None).await?.error_for_status()?.json()
    }
}
