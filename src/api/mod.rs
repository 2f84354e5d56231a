//! Remote API
//!
//! Transport, the authenticated client with its retry contract, and the
//! typed services built on top of it.

mod transport;
mod client;
mod board_api;
mod auth_api;

pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};
pub use client::{ApiClient, HttpCredentialRefresher};
pub use board_api::{
    BoardApi, CreateBoardData, CreateCardData, CreateListData, UpdateBoardData, UpdateCardData,
    UpdateCardUsersData, UpdateListData,
};
pub use auth_api::AuthApi;

use std::sync::Arc;

use crate::auth::{AuthSession, RefreshGate};
use crate::config::ClientConfig;
use crate::domain::DomainResult;
use crate::repository::{CredentialStore, FileCredentialStore, MemoryCredentialStore};

/// Everything a client needs, sharing one session and one refresh gate
pub struct KanbanServices {
    pub session: Arc<AuthSession>,
    pub gate: Arc<RefreshGate>,
    pub client: Arc<ApiClient>,
    pub boards: Arc<BoardApi>,
    pub auth: AuthApi,
}

impl KanbanServices {
    /// Build against the real API, resuming any stored credentials
    pub async fn new(config: &ClientConfig) -> DomainResult<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(config)?);
        let store: Arc<dyn CredentialStore> = match &config.credentials_path {
            Some(path) => Arc::new(FileCredentialStore::new(path.clone())),
            None => Arc::new(MemoryCredentialStore::new()),
        };
        Self::with_transport(transport, store).await
    }

    pub async fn with_transport(transport: Arc<dyn Transport>, store: Arc<dyn CredentialStore>) -> DomainResult<Self> {
        let session = Arc::new(AuthSession::restore(store).await?);
        let refresher = Arc::new(HttpCredentialRefresher::new(transport.clone()));
        let gate = Arc::new(RefreshGate::new(session.clone(), refresher));
        let client = Arc::new(ApiClient::new(transport, session.clone(), gate.clone()));
        Ok(Self {
            session,
            gate,
            boards: Arc::new(BoardApi::new(client.clone())),
            auth: AuthApi::new(client.clone()),
            client,
        })
    }
}
