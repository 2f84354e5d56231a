//! Drop Target Resolution
//!
//! Maps whatever the pointer is over to a `(list, insertion index)` pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Board, DomainError};

const LIST_SLOT_PREFIX: &str = "list-";

/// What the pointer is over. Decided once at the DOM boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OverTarget {
    /// Over a card row
    Card(u32),
    /// Over a list's empty area / trailing slot
    ListSlot(u32),
}

impl FromStr for OverTarget {
    type Err = DomainError;

    /// Parses DOM ids: `list-<id>` for list slots, `<id>` or `card-<id>` for cards
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |raw: &str| {
            raw.parse::<u32>()
                .map_err(|_| DomainError::UnresolvableTarget(format!("malformed target id {:?}", s)))
        };
        if let Some(rest) = s.strip_prefix(LIST_SLOT_PREFIX) {
            return parse(rest).map(OverTarget::ListSlot);
        }
        let raw = s.strip_prefix("card-").unwrap_or(s);
        parse(raw).map(OverTarget::Card)
    }
}

impl fmt::Display for OverTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverTarget::Card(id) => write!(f, "{}", id),
            OverTarget::ListSlot(id) => write!(f, "{}{}", LIST_SLOT_PREFIX, id),
        }
    }
}

/// Which half of a card row the pointer is in; classified by the caller
/// from pointer geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerHalf {
    /// Insert before the card
    #[default]
    Upper,
    /// Insert after the card
    Lower,
}

impl PointerHalf {
    /// Classify a pointer y coordinate against a row's vertical extent
    pub fn classify(pointer_y: f64, row_top: f64, row_height: f64) -> Self {
        if pointer_y - row_top > row_height / 2.0 {
            PointerHalf::Lower
        } else {
            PointerHalf::Upper
        }
    }
}

/// A resolved drop location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropPoint {
    pub list_id: u32,
    /// Final index of the dragged card within `list_id`
    pub index: usize,
}

/// Resolve a pointer-over target for the card being dragged.
///
/// Returns `None` when the target no longer exists or is the dragged card
/// itself. The index is clamped to the range the card can occupy: at most
/// `len - 1` within its own list, at most `len` in any other list.
pub fn resolve_target(
    board: &Board,
    over: OverTarget,
    half: PointerHalf,
    active_card_id: u32,
    source_list_id: u32,
) -> Option<DropPoint> {
    let (list_id, raw_index) = match over {
        OverTarget::Card(card_id) if card_id == active_card_id => return None,
        OverTarget::Card(card_id) => {
            let (list_id, index) = board.locate_card(card_id)?;
            match half {
                PointerHalf::Upper => (list_id, index),
                PointerHalf::Lower => (list_id, index + 1),
            }
        }
        OverTarget::ListSlot(list_id) => (list_id, board.list(list_id)?.len()),
    };

    let list = board.list(list_id)?;
    let max_index = if list_id == source_list_id {
        list.len().saturating_sub(1)
    } else {
        list.len()
    };

    Some(DropPoint {
        list_id,
        index: raw_index.min(max_index),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Card, List};

    fn board() -> Board {
        Board::new(1, "Board").with_lists(vec![
            List::new(10, "A", 0).with_cards(vec![
                Card::new(1, "a", 10, 0),
                Card::new(2, "b", 10, 1),
                Card::new(3, "c", 10, 2),
            ]),
            List::new(20, "B", 1).with_cards(vec![Card::new(4, "d", 20, 0)]),
            List::new(30, "C", 2),
        ])
    }

    #[test]
    fn test_parse_over_ids() {
        assert_eq!("list-20".parse::<OverTarget>().unwrap(), OverTarget::ListSlot(20));
        assert_eq!("7".parse::<OverTarget>().unwrap(), OverTarget::Card(7));
        assert_eq!("card-7".parse::<OverTarget>().unwrap(), OverTarget::Card(7));
        assert!(matches!("list-x".parse::<OverTarget>(), Err(DomainError::UnresolvableTarget(_))));
        assert_eq!(OverTarget::ListSlot(3).to_string(), "list-3");
    }

    #[test]
    fn test_card_target_in_other_list() {
        let b = board();
        let upper = resolve_target(&b, OverTarget::Card(4), PointerHalf::Upper, 2, 10);
        assert_eq!(upper, Some(DropPoint { list_id: 20, index: 0 }));
        let lower = resolve_target(&b, OverTarget::Card(4), PointerHalf::Lower, 2, 10);
        assert_eq!(lower, Some(DropPoint { list_id: 20, index: 1 }));
    }

    #[test]
    fn test_list_slot_appends() {
        let b = board();
        assert_eq!(
            resolve_target(&b, OverTarget::ListSlot(20), PointerHalf::Upper, 1, 10),
            Some(DropPoint { list_id: 20, index: 1 })
        );
        assert_eq!(
            resolve_target(&b, OverTarget::ListSlot(30), PointerHalf::Lower, 1, 10),
            Some(DropPoint { list_id: 30, index: 0 })
        );
    }

    #[test]
    fn test_own_list_is_clamped() {
        let b = board();
        assert_eq!(
            resolve_target(&b, OverTarget::ListSlot(10), PointerHalf::Upper, 1, 10),
            Some(DropPoint { list_id: 10, index: 2 })
        );
        assert_eq!(
            resolve_target(&b, OverTarget::Card(3), PointerHalf::Lower, 1, 10),
            Some(DropPoint { list_id: 10, index: 2 })
        );
    }

    #[test]
    fn test_self_and_stale_targets() {
        let b = board();
        assert_eq!(resolve_target(&b, OverTarget::Card(1), PointerHalf::Upper, 1, 10), None);
        assert_eq!(resolve_target(&b, OverTarget::Card(99), PointerHalf::Upper, 1, 10), None);
        assert_eq!(resolve_target(&b, OverTarget::ListSlot(99), PointerHalf::Upper, 1, 10), None);
    }

    #[test]
    fn test_classify_half() {
        assert_eq!(PointerHalf::classify(105.0, 100.0, 40.0), PointerHalf::Upper);
        assert_eq!(PointerHalf::classify(130.0, 100.0, 40.0), PointerHalf::Lower);
    }
}
