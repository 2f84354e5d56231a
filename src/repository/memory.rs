//! In-Memory Repositories
//!
//! Headless implementations: no network, no disk. The board repository
//! applies moves to its own copy the way the server would.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::traits::{BoardRepository, CredentialStore};
use crate::dnd::{apply_diff, PositionUpdate};
use crate::domain::{Board, DomainError, DomainResult, TokenPair};

/// In-memory board store
#[derive(Clone, Default)]
pub struct InMemoryBoardRepository {
    boards: Arc<Mutex<HashMap<u32, Board>>>,
    writes: Arc<Mutex<Vec<Vec<PositionUpdate>>>>,
}

impl InMemoryBoardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, board: Board) {
        self.boards.lock().await.insert(board.id, board.normalized());
    }

    /// Every batched write received so far, in order
    pub async fn writes(&self) -> Vec<Vec<PositionUpdate>> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl BoardRepository for InMemoryBoardRepository {
    async fn fetch_board(&self, board_id: u32) -> DomainResult<Board> {
        self.boards
            .lock()
            .await
            .get(&board_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("board {}", board_id)))
    }

    async fn persist_move(&self, board_id: u32, updates: &[PositionUpdate]) -> DomainResult<Option<Board>> {
        let mut boards = self.boards.lock().await;
        let board = boards
            .get_mut(&board_id)
            .ok_or_else(|| DomainError::NotFound(format!("board {}", board_id)))?;

        // All or nothing, like the server's transaction.
        let mut staged = board.clone();
        apply_diff(&mut staged, updates)?;
        *board = staged;

        self.writes.lock().await.push(updates.to_vec());
        Ok(Some(board.clone()))
    }
}

/// Credentials held for the lifetime of the process
#[derive(Default)]
pub struct MemoryCredentialStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> DomainResult<Option<TokenPair>> {
        Ok(self.tokens.lock().await.clone())
    }

    async fn store(&self, tokens: &TokenPair) -> DomainResult<()> {
        *self.tokens.lock().await = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> DomainResult<()> {
        *self.tokens.lock().await = None;
        Ok(())
    }
}
