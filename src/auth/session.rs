//! Authenticated Session
//!
//! Owns the credential store and the signed-in user. Clearing it is the
//! forced logout; watchers are told through a `watch` channel.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::domain::{DomainResult, TokenPair, User};
use crate::repository::CredentialStore;

/// Signed-in state published to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    SignedOut,
    SignedIn(Option<User>),
}

impl SessionStatus {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, SessionStatus::SignedIn(_))
    }
}

pub struct AuthSession {
    store: Arc<dyn CredentialStore>,
    user: Mutex<Option<User>>,
    status: watch::Sender<SessionStatus>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (status, _) = watch::channel(SessionStatus::SignedOut);
        Self {
            store,
            user: Mutex::new(None),
            status,
        }
    }

    /// Create a session and resume from whatever the store already holds
    pub async fn restore(store: Arc<dyn CredentialStore>) -> DomainResult<Self> {
        let session = Self::new(store);
        if session.store.load().await?.is_some() {
            session.status.send_replace(SessionStatus::SignedIn(None));
        }
        Ok(session)
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status.borrow().is_signed_in()
    }

    pub async fn user(&self) -> Option<User> {
        self.user.lock().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        match self.store.load().await {
            Ok(tokens) => tokens.map(|t| t.token),
            Err(e) => {
                warn!("failed to read access token: {}", e);
                None
            }
        }
    }

    pub async fn refresh_token(&self) -> DomainResult<Option<String>> {
        Ok(self.store.load().await?.map(|t| t.refresh_token))
    }

    /// Sign in with freshly issued credentials
    pub async fn establish(&self, tokens: &TokenPair, user: User) -> DomainResult<()> {
        self.store.store(tokens).await?;
        info!(user_id = user.id, "signed in");
        *self.user.lock().await = Some(user.clone());
        self.status.send_replace(SessionStatus::SignedIn(Some(user)));
        Ok(())
    }

    /// Replace the tokens of the current session after a refresh
    pub async fn rotate(&self, tokens: &TokenPair) -> DomainResult<()> {
        self.store.store(tokens).await
    }

    /// Forget everything; equivalent to logging out
    pub async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("failed to clear stored credentials: {}", e);
        }
        *self.user.lock().await = None;
        if self.status.send_replace(SessionStatus::SignedOut).is_signed_in() {
            info!("signed out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryCredentialStore;

    fn user() -> User {
        User { id: 5, email: "ann@example.com".to_string(), username: "ann".to_string() }
    }

    #[tokio::test]
    async fn test_establish_and_clear() {
        let session = AuthSession::new(Arc::new(MemoryCredentialStore::new()));
        let mut status = session.subscribe();
        assert!(!session.is_authenticated());

        session.establish(&TokenPair::new("a1", "r1"), user()).await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.access_token().await.as_deref(), Some("a1"));
        assert_eq!(session.user().await, Some(user()));
        assert!(status.has_changed().unwrap());
        assert_eq!(*status.borrow_and_update(), SessionStatus::SignedIn(Some(user())));

        session.clear().await;
        assert!(!session.is_authenticated());
        assert!(session.access_token().await.is_none());
        assert!(session.user().await.is_none());
        assert_eq!(*status.borrow_and_update(), SessionStatus::SignedOut);
    }

    #[tokio::test]
    async fn test_restore_from_store() {
        let store = Arc::new(MemoryCredentialStore::with_tokens(TokenPair::new("a", "r")));
        let session = AuthSession::restore(store).await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.refresh_token().await.unwrap().as_deref(), Some("r"));
    }
}
