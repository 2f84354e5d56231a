//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities,
//! plus the error taxonomy shared by every layer of the crate.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// `Clone` is required: a single refresh failure is delivered to every
/// request queued behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A drag was started while another one was still active.
    #[error("Invalid drag session state: {0}")]
    InvalidSessionState(String),
    /// A pointer-over identifier refers to a card or list that no longer exists.
    #[error("Unresolvable drop target: {0}")]
    UnresolvableTarget(String),
    #[error("Move commit failed: {0}")]
    MoveCommitFailed(String),
    #[error("Auth refresh failed: {0}")]
    AuthRefreshFailed(String),
    #[error("Request failed after credential refresh: {0}")]
    RetryExhausted(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// How the UI layer should surface an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// The session is gone; the user has been logged out.
    AuthExpiredTerminal,
    /// The move was not persisted; re-fetching the board recovers.
    MoveFailedRecoverable,
    /// An ordinary request failure.
    RequestFailed,
    /// Local, never shown to the user.
    Silent,
    Internal,
}

impl DomainError {
    pub fn report(&self) -> ReportKind {
        match self {
            DomainError::AuthRefreshFailed(_) => ReportKind::AuthExpiredTerminal,
            DomainError::MoveCommitFailed(_) => ReportKind::MoveFailedRecoverable,
            DomainError::InvalidSessionState(_) | DomainError::UnresolvableTarget(_) => ReportKind::Silent,
            DomainError::Internal(_) => ReportKind::Internal,
            _ => ReportKind::RequestFailed,
        }
    }

    pub fn is_terminal_auth_failure(&self) -> bool {
        matches!(self, DomainError::AuthRefreshFailed(_))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Serialization(e.to_string())
    }
}
