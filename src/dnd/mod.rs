//! Drag-and-Drop Reordering Engine
//!
//! pointer events -> [`DragSession`] -> [`resolve_target`] -> [`compute_diff`]
//! -> [`MoveCommitter`] -> board repository.

mod target;
mod session;
mod diff;
mod commit;
mod controller;

pub use target::{resolve_target, DropPoint, OverTarget, PointerHalf};
pub use session::{DragSession, DragStatus};
pub use diff::{apply_diff, compute_diff, PendingMove, PositionUpdate};
pub use commit::{CommitOutcome, MoveCommitter};
pub use controller::BoardDragController;
