//! Move Commit
//!
//! Sends a computed diff to the board repository as one batched write and
//! reconciles the local board with the outcome.

use std::sync::Arc;

use tracing::{info, warn};

use super::diff::{apply_diff, compute_diff, PendingMove, PositionUpdate};
use crate::domain::{Board, DomainError, DomainResult};
use crate::repository::BoardRepository;

/// What happened to the local board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The move changed nothing; no write was sent
    Unchanged,
    /// The write succeeded and the diff was applied locally
    Applied,
    /// The write succeeded and the board returned by the backend replaced
    /// the local one
    Replaced,
}

pub struct MoveCommitter<R: BoardRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: BoardRepository + ?Sized> Clone for MoveCommitter<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R: BoardRepository + ?Sized> MoveCommitter<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Compute the diff for `mv` on `board` and commit it
    pub async fn commit(&self, board: &mut Board, mv: &PendingMove) -> DomainResult<CommitOutcome> {
        let diff = compute_diff(&board.lists, mv)?;
        self.commit_diff(board, &diff).await
    }

    /// Commit a precomputed diff.
    ///
    /// The diff is applied optimistically before the write; a failed write
    /// restores the pre-move snapshot.
    pub async fn commit_diff(&self, board: &mut Board, diff: &[PositionUpdate]) -> DomainResult<CommitOutcome> {
        if diff.is_empty() {
            return Ok(CommitOutcome::Unchanged);
        }

        let mut staged = board.clone();
        apply_diff(&mut staged, diff)?;
        let snapshot = std::mem::replace(board, staged);

        match self.repo.persist_move(board.id, diff).await {
            Ok(Some(fresh)) => {
                info!(board_id = board.id, updates = diff.len(), "move committed");
                *board = fresh.normalized();
                Ok(CommitOutcome::Replaced)
            }
            Ok(None) => {
                info!(board_id = board.id, updates = diff.len(), "move committed");
                Ok(CommitOutcome::Applied)
            }
            Err(e) => {
                warn!(board_id = board.id, "move commit failed, rolling back: {}", e);
                *board = snapshot;
                Err(match e {
                    DomainError::AuthRefreshFailed(_) => e,
                    other => DomainError::MoveCommitFailed(other.to_string()),
                })
            }
        }
    }
}
