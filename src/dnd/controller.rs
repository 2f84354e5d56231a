//! Board Drag Controller
//!
//! Owns the board snapshot being displayed, the single drag session and the
//! committer. All methods run on the UI task; the only suspension point is
//! the commit write.

use std::sync::Arc;

use tracing::warn;

use super::commit::{CommitOutcome, MoveCommitter};
use super::session::{DragSession, DragStatus};
use super::target::{DropPoint, OverTarget, PointerHalf};
use crate::domain::{Board, DomainResult};
use crate::repository::BoardRepository;

pub struct BoardDragController<R: BoardRepository + ?Sized> {
    board: Board,
    session: DragSession,
    committer: MoveCommitter<R>,
}

impl<R: BoardRepository + ?Sized> BoardDragController<R> {
    pub fn new(board: Board, repo: Arc<R>) -> Self {
        Self {
            board: board.normalized(),
            session: DragSession::new(),
            committer: MoveCommitter::new(repo),
        }
    }

    /// Fetch the board from the repository and wrap it
    pub async fn load(board_id: u32, repo: Arc<R>) -> DomainResult<Self> {
        let board = repo.fetch_board(board_id).await?;
        Ok(Self::new(board, repo))
    }

    /// Current ordering, for rendering
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> DragStatus {
        self.session.status()
    }

    /// Replace the displayed board, e.g. after a CRUD form saved something
    pub fn replace_board(&mut self, board: Board) {
        self.board = board.normalized();
    }

    /// Re-fetch the authoritative board. Recovers from a failed move.
    pub async fn reload(&mut self) -> DomainResult<()> {
        let board = self.committer.repository().fetch_board(self.board.id).await?;
        self.board = board.normalized();
        Ok(())
    }

    pub fn pick_up(&mut self, card_id: u32) -> DomainResult<()> {
        self.session.start(&self.board, card_id)
    }

    pub fn pointer_over(&mut self, over: Option<OverTarget>, half: PointerHalf) -> Option<DropPoint> {
        self.session.pointer_over(&self.board, over, half)
    }

    pub fn cancel(&mut self) {
        self.session.cancel();
    }

    /// Release the dragged card. The session is `Idle` again when this
    /// returns, whatever the outcome.
    pub async fn drop_card(&mut self) -> DomainResult<CommitOutcome> {
        let Some(mv) = self.session.drop_card(&self.board) else {
            return Ok(CommitOutcome::Unchanged);
        };

        let result = self.committer.commit(&mut self.board, &mv).await;
        self.session.finish();
        if let Err(e) = &result {
            warn!(card_id = mv.card_id, report = ?e.report(), "drop failed: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::PositionUpdate;
    use crate::domain::{Card, DomainError, List, ReportKind};
    use crate::repository::InMemoryBoardRepository;
    use async_trait::async_trait;

    fn board() -> Board {
        Board::new(1, "Board").with_lists(vec![
            List::new(10, "A", 0).with_cards(vec![
                Card::new(1, "a", 10, 0),
                Card::new(2, "b", 10, 1),
                Card::new(3, "c", 10, 2),
            ]),
            List::new(20, "B", 1).with_cards(vec![Card::new(4, "d", 20, 0)]),
        ])
    }

    async fn controller() -> (BoardDragController<InMemoryBoardRepository>, Arc<InMemoryBoardRepository>) {
        let repo = Arc::new(InMemoryBoardRepository::new());
        repo.insert(board()).await;
        let controller = BoardDragController::load(1, repo.clone()).await.unwrap();
        (controller, repo)
    }

    fn titles(list: &List) -> Vec<&str> {
        list.cards.iter().map(|c| c.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_drag_within_list() {
        let (mut ctl, repo) = controller().await;
        ctl.pick_up(1).unwrap();
        ctl.pointer_over(Some(OverTarget::Card(3)), PointerHalf::Upper);
        assert_eq!(ctl.status(), DragStatus::Target { card_id: 1, list_id: 10, index: 2 });

        assert_eq!(ctl.drop_card().await.unwrap(), CommitOutcome::Replaced);
        assert_eq!(ctl.status(), DragStatus::Idle);
        assert_eq!(titles(&ctl.board().lists[0]), vec!["b", "c", "a"]);
        assert_eq!(
            repo.writes().await,
            vec![vec![
                PositionUpdate { id: 1, list_id: 10, position: 2 },
                PositionUpdate { id: 2, list_id: 10, position: 0 },
                PositionUpdate { id: 3, list_id: 10, position: 1 },
            ]]
        );
    }

    #[tokio::test]
    async fn test_drag_across_lists_onto_slot() {
        let (mut ctl, repo) = controller().await;
        ctl.pick_up(2).unwrap();
        ctl.pointer_over(Some(OverTarget::ListSlot(20)), PointerHalf::Upper);
        ctl.drop_card().await.unwrap();

        assert_eq!(titles(&ctl.board().lists[0]), vec!["a", "c"]);
        assert_eq!(titles(&ctl.board().lists[1]), vec!["d", "b"]);
        ctl.board().check_invariants().unwrap();
        assert_eq!(repo.fetch_board(1).await.unwrap(), *ctl.board());
    }

    #[tokio::test]
    async fn test_cancelled_drag_changes_nothing() {
        let (mut ctl, repo) = controller().await;
        let before = ctl.board().clone();

        ctl.pick_up(3).unwrap();
        ctl.pointer_over(Some(OverTarget::Card(4)), PointerHalf::Lower);
        ctl.cancel();

        assert_eq!(ctl.drop_card().await.unwrap(), CommitOutcome::Unchanged);
        assert_eq!(*ctl.board(), before);
        assert!(repo.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_double_pick_up_keeps_first_drag() {
        let (mut ctl, _repo) = controller().await;
        ctl.pick_up(1).unwrap();
        assert!(matches!(ctl.pick_up(4), Err(DomainError::InvalidSessionState(_))));
        assert_eq!(ctl.status(), DragStatus::Dragging { card_id: 1 });
    }

    struct OfflineRepository;

    #[async_trait]
    impl BoardRepository for OfflineRepository {
        async fn fetch_board(&self, _board_id: u32) -> DomainResult<Board> {
            Ok(board())
        }

        async fn persist_move(&self, _board_id: u32, _updates: &[PositionUpdate]) -> DomainResult<Option<Board>> {
            Err(DomainError::Transport("request timed out".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_drop_resets_session_and_board() {
        let mut ctl = BoardDragController::new(board(), Arc::new(OfflineRepository));
        ctl.pick_up(1).unwrap();
        ctl.pointer_over(Some(OverTarget::ListSlot(20)), PointerHalf::Upper);

        let err = ctl.drop_card().await.unwrap_err();
        assert_eq!(err.report(), ReportKind::MoveFailedRecoverable);
        assert_eq!(ctl.status(), DragStatus::Idle);
        assert_eq!(*ctl.board(), board());

        ctl.reload().await.unwrap();
        assert_eq!(*ctl.board(), board());
    }
}
