//! Drag Session State Machine
//!
//! `Idle -> Dragging -> (Idle | Committing) -> Idle`
//!
//! The session never mutates the board. Pointer-over events only move the
//! preview target; the board snapshot current at drop time decides the move.

use serde::Serialize;
use tracing::{debug, error};

use super::diff::PendingMove;
use super::target::{resolve_target, DropPoint, OverTarget, PointerHalf};
use crate::domain::{Board, DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Dragging {
        active_card_id: u32,
        source_list_id: u32,
        pointer_target: Option<DropPoint>,
    },
    Committing(PendingMove),
}

/// Drag status exposed for visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DragStatus {
    Idle,
    Dragging { card_id: u32 },
    Target { card_id: u32, list_id: u32, index: usize },
    Committing { card_id: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    phase: Phase,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    pub fn status(&self) -> DragStatus {
        match &self.phase {
            Phase::Idle => DragStatus::Idle,
            Phase::Dragging {
                active_card_id,
                pointer_target: None,
                ..
            } => DragStatus::Dragging { card_id: *active_card_id },
            Phase::Dragging {
                active_card_id,
                pointer_target: Some(point),
                ..
            } => DragStatus::Target {
                card_id: *active_card_id,
                list_id: point.list_id,
                index: point.index,
            },
            Phase::Committing(mv) => DragStatus::Committing { card_id: mv.card_id },
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn active_card_id(&self) -> Option<u32> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Dragging { active_card_id, .. } => Some(*active_card_id),
            Phase::Committing(mv) => Some(mv.card_id),
        }
    }

    pub fn pointer_target(&self) -> Option<DropPoint> {
        match &self.phase {
            Phase::Dragging { pointer_target, .. } => *pointer_target,
            _ => None,
        }
    }

    /// Pick up `card_id`. Only one drag may be active at a time.
    pub fn start(&mut self, board: &Board, card_id: u32) -> DomainResult<()> {
        if !self.is_idle() {
            let message = format!(
                "cannot pick up card {} while {:?} is in progress",
                card_id,
                self.status()
            );
            error!("{}", message);
            return Err(DomainError::InvalidSessionState(message));
        }
        let (source_list_id, _) = board
            .locate_card(card_id)
            .ok_or_else(|| DomainError::UnresolvableTarget(format!("card {} is not on the board", card_id)))?;

        debug!(card_id, source_list_id, "drag started");
        self.phase = Phase::Dragging {
            active_card_id: card_id,
            source_list_id,
            pointer_target: None,
        };
        Ok(())
    }

    /// Handle a pointer-over event. `None` means the pointer left every
    /// drop target. Unresolvable targets clear the preview.
    pub fn pointer_over(&mut self, board: &Board, over: Option<OverTarget>, half: PointerHalf) -> Option<DropPoint> {
        let Phase::Dragging {
            active_card_id,
            source_list_id,
            pointer_target,
        } = &mut self.phase
        else {
            return None;
        };

        let resolved = over.and_then(|over| {
            let point = resolve_target(board, over, half, *active_card_id, *source_list_id);
            if point.is_none() {
                debug!(%over, "pointer over unresolvable target");
            }
            point
        });
        *pointer_target = resolved;
        resolved
    }

    /// Release the pointer. Returns the move to commit when the pointer is
    /// over a valid target; otherwise the session returns to `Idle`.
    pub fn drop_card(&mut self, board: &Board) -> Option<PendingMove> {
        let Phase::Dragging {
            active_card_id,
            pointer_target,
            ..
        } = self.phase
        else {
            return None;
        };

        let pending = pointer_target.and_then(|target| {
            // Re-read the origin from the drop-time snapshot.
            let (from_list_id, from_index) = board.locate_card(active_card_id)?;
            board.list(target.list_id)?;
            Some(PendingMove {
                card_id: active_card_id,
                from_list_id,
                to_list_id: target.list_id,
                from_index,
                to_index: target.index,
            })
        });

        match pending {
            Some(mv) => {
                debug!(?mv, "drop accepted");
                self.phase = Phase::Committing(mv);
                Some(mv)
            }
            None => {
                debug!(card_id = active_card_id, "dropped over no target");
                self.phase = Phase::Idle;
                None
            }
        }
    }

    /// Abandon the drag without side effects. No-op while committing.
    pub fn cancel(&mut self) {
        if let Phase::Dragging { active_card_id, .. } = self.phase {
            debug!(card_id = active_card_id, "drag cancelled");
            self.phase = Phase::Idle;
        }
    }

    /// Leave `Committing`, whatever the commit outcome was
    pub fn finish(&mut self) {
        if matches!(self.phase, Phase::Committing(_)) {
            self.phase = Phase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Card, List};

    fn board() -> Board {
        Board::new(1, "Board").with_lists(vec![
            List::new(10, "A", 0).with_cards(vec![Card::new(1, "a", 10, 0), Card::new(2, "b", 10, 1)]),
            List::new(20, "B", 1).with_cards(vec![Card::new(3, "c", 20, 0)]),
        ])
    }

    #[test]
    fn test_full_lifecycle() {
        let b = board();
        let mut session = DragSession::new();
        assert_eq!(session.status(), DragStatus::Idle);

        session.start(&b, 2).unwrap();
        assert_eq!(session.status(), DragStatus::Dragging { card_id: 2 });

        let point = session.pointer_over(&b, Some(OverTarget::Card(3)), PointerHalf::Upper);
        assert_eq!(point, Some(DropPoint { list_id: 20, index: 0 }));
        assert_eq!(session.status(), DragStatus::Target { card_id: 2, list_id: 20, index: 0 });

        let mv = session.drop_card(&b).unwrap();
        assert_eq!(
            mv,
            PendingMove { card_id: 2, from_list_id: 10, to_list_id: 20, from_index: 1, to_index: 0 }
        );
        assert_eq!(session.status(), DragStatus::Committing { card_id: 2 });

        session.finish();
        assert!(session.is_idle());
    }

    #[test]
    fn test_second_pick_up_is_rejected() {
        let b = board();
        let mut session = DragSession::new();
        session.start(&b, 1).unwrap();
        let err = session.start(&b, 2).unwrap_err();
        assert!(matches!(err, DomainError::InvalidSessionState(_)));
        assert_eq!(session.active_card_id(), Some(1));
    }

    #[test]
    fn test_pick_up_unknown_card() {
        let mut session = DragSession::new();
        assert!(matches!(session.start(&board(), 42), Err(DomainError::UnresolvableTarget(_))));
        assert!(session.is_idle());
    }

    #[test]
    fn test_drop_over_nothing_returns_to_idle() {
        let b = board();
        let mut session = DragSession::new();
        session.start(&b, 1).unwrap();
        session.pointer_over(&b, Some(OverTarget::ListSlot(20)), PointerHalf::Upper);
        session.pointer_over(&b, None, PointerHalf::Upper);
        assert_eq!(session.drop_card(&b), None);
        assert!(session.is_idle());
    }

    #[test]
    fn test_hovering_self_clears_preview() {
        let b = board();
        let mut session = DragSession::new();
        session.start(&b, 1).unwrap();
        session.pointer_over(&b, Some(OverTarget::Card(2)), PointerHalf::Upper);
        assert!(session.pointer_target().is_some());
        session.pointer_over(&b, Some(OverTarget::Card(1)), PointerHalf::Lower);
        assert!(session.pointer_target().is_none());
    }

    #[test]
    fn test_drop_uses_drop_time_snapshot() {
        let b = board();
        let mut session = DragSession::new();
        session.start(&b, 2).unwrap();
        session.pointer_over(&b, Some(OverTarget::ListSlot(20)), PointerHalf::Upper);

        // Card 1 was deleted elsewhere while dragging; card 2 is now first.
        let mut later = b.clone();
        later.remove_card(1);
        let mv = session.drop_card(&later).unwrap();
        assert_eq!(mv.from_index, 0);
    }

    #[test]
    fn test_drop_when_card_vanished() {
        let b = board();
        let mut session = DragSession::new();
        session.start(&b, 2).unwrap();
        session.pointer_over(&b, Some(OverTarget::ListSlot(20)), PointerHalf::Upper);

        let mut later = b.clone();
        later.remove_card(2);
        assert_eq!(session.drop_card(&later), None);
        assert!(session.is_idle());
    }

    #[test]
    fn test_cancel_is_side_effect_free() {
        let b = board();
        let before = b.clone();
        let mut session = DragSession::new();
        session.start(&b, 1).unwrap();
        session.pointer_over(&b, Some(OverTarget::Card(3)), PointerHalf::Lower);
        session.cancel();
        assert!(session.is_idle());
        assert_eq!(b, before);
        // Events after cancel are ignored.
        assert_eq!(session.pointer_over(&b, Some(OverTarget::Card(3)), PointerHalf::Upper), None);
        assert_eq!(session.drop_card(&b), None);
    }
}
