//! Repository Layer - Core Traits
//!
//! The seams between the engine and its collaborators.
//! Implementations can be the remote API, in-memory, files, etc.

use async_trait::async_trait;

use crate::dnd::PositionUpdate;
use crate::domain::{Board, DomainResult, TokenPair};

/// Board persistence consumed by the move committer
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Fetch the authoritative board with its lists and cards
    async fn fetch_board(&self, board_id: u32) -> DomainResult<Board>;

    /// Persist a move as one batched write.
    ///
    /// Returns the updated board when the backend sends one back.
    async fn persist_move(&self, board_id: u32, updates: &[PositionUpdate]) -> DomainResult<Option<Board>>;
}

/// Storage for the session's credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> DomainResult<Option<TokenPair>>;

    async fn store(&self, tokens: &TokenPair) -> DomainResult<()>;

    async fn clear(&self) -> DomainResult<()>;
}
