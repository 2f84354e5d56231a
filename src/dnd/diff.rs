//! Position Diff Calculation
//!
//! Turns one card move into the minimal set of `{id, list_id, position}`
//! updates that re-establishes dense ordering in every affected list.

use serde::{Deserialize, Serialize};

use crate::domain::{Board, DomainError, DomainResult, List};
use crate::ordering::OrderedCollection;

/// A resolved move awaiting commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMove {
    pub card_id: u32,
    pub from_list_id: u32,
    pub to_list_id: u32,
    pub from_index: usize,
    pub to_index: usize,
}

impl PendingMove {
    pub fn is_same_list(&self) -> bool {
        self.from_list_id == self.to_list_id
    }
}

/// One persisted position change; the wire shape of the batched move call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: u32,
    pub list_id: u32,
    pub position: u32,
}

impl PositionUpdate {
    fn new(id: u32, list_id: u32, position: usize) -> Self {
        Self {
            id,
            list_id,
            position: position as u32,
        }
    }
}

fn find_list(lists: &[List], list_id: u32) -> DomainResult<&List> {
    lists
        .iter()
        .find(|l| l.id == list_id)
        .ok_or_else(|| DomainError::UnresolvableTarget(format!("list {} no longer exists", list_id)))
}

/// Compute the updates for `mv` against the ordering in `lists`.
///
/// The moved card always comes first. A same-list move only touches the
/// range between the old and new index. A cross-list move shifts the
/// destination tail up and compacts the source tail down.
pub fn compute_diff(lists: &[List], mv: &PendingMove) -> DomainResult<Vec<PositionUpdate>> {
    let source = find_list(lists, mv.from_list_id)?;
    match source.cards.get(mv.from_index) {
        Some(card) if card.id == mv.card_id => {}
        _ => {
            return Err(DomainError::UnresolvableTarget(format!(
                "card {} is not at index {} of list {}",
                mv.card_id, mv.from_index, mv.from_list_id
            )))
        }
    }

    if mv.is_same_list() {
        let old = mv.from_index;
        let new = mv.to_index.min(source.len() - 1);
        if old == new {
            return Ok(Vec::new());
        }

        let mut updates = vec![PositionUpdate::new(mv.card_id, source.id, new)];
        let (lo, hi) = (old.min(new), old.max(new));
        for (i, card) in source.cards.iter().enumerate().take(hi + 1).skip(lo) {
            if i == old {
                continue;
            }
            let shifted = if old < new { i - 1 } else { i + 1 };
            updates.push(PositionUpdate::new(card.id, source.id, shifted));
        }
        return Ok(updates);
    }

    let destination = find_list(lists, mv.to_list_id)?;
    let to_index = mv.to_index.min(destination.len());

    let mut updates = vec![PositionUpdate::new(mv.card_id, destination.id, to_index)];
    for (i, card) in destination.cards.iter().enumerate().skip(to_index) {
        updates.push(PositionUpdate::new(card.id, destination.id, i + 1));
    }
    for (i, card) in source.cards.iter().enumerate().skip(mv.from_index + 1) {
        updates.push(PositionUpdate::new(card.id, source.id, i - 1));
    }
    Ok(updates)
}

/// Apply a diff to the in-memory board.
///
/// Cards not named in the diff keep their positions, so the board must be
/// densely ordered beforehand. Fails if the result is not dense.
pub fn apply_diff(board: &mut Board, diff: &[PositionUpdate]) -> DomainResult<()> {
    let mut touched: Vec<u32> = Vec::new();

    for update in diff {
        let (current_list, index) = board
            .locate_card(update.id)
            .ok_or_else(|| DomainError::NotFound(format!("card {}", update.id)))?;

        if current_list != update.list_id {
            if board.list(update.list_id).is_none() {
                return Err(DomainError::NotFound(format!("list {}", update.list_id)));
            }
            let source = board
                .list_mut(current_list)
                .ok_or_else(|| DomainError::NotFound(format!("list {}", current_list)))?;
            let mut card = source.cards.remove(index);
            card.list_id = update.list_id;
            card.position = update.position;
            if let Some(destination) = board.list_mut(update.list_id) {
                destination.cards.push(card);
            }
        } else if let Some(card) = board
            .list_mut(current_list)
            .and_then(|l| l.cards.get_mut(index))
        {
            card.position = update.position;
        }

        for list_id in [current_list, update.list_id] {
            if !touched.contains(&list_id) {
                touched.push(list_id);
            }
        }
    }

    for list_id in touched {
        if let Some(list) = board.list_mut(list_id) {
            list.cards.sort_by_position();
            if !list.cards.is_dense() {
                return Err(DomainError::Internal(format!(
                    "applying move left list {} with a gap or duplicate position",
                    list_id
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Card;
    use proptest::prelude::*;

    /// List `id` at position `id / 10 - 1`, so ids 10, 20, 30 are dense
    fn list(id: u32, card_ids: &[u32]) -> List {
        List::new(id, format!("list {}", id), (id / 10).saturating_sub(1)).with_cards(
            card_ids
                .iter()
                .map(|&cid| Card::new(cid, format!("card {}", cid), id, 0))
                .collect(),
        )
    }

    fn same_list(card_id: u32, list_id: u32, from: usize, to: usize) -> PendingMove {
        PendingMove { card_id, from_list_id: list_id, to_list_id: list_id, from_index: from, to_index: to }
    }

    fn upd(id: u32, list_id: u32, position: u32) -> PositionUpdate {
        PositionUpdate { id, list_id, position }
    }

    #[test]
    fn test_move_first_to_last_in_same_list() {
        let lists = vec![list(10, &[1, 2, 3])];
        let diff = compute_diff(&lists, &same_list(1, 10, 0, 2)).unwrap();
        assert_eq!(diff, vec![upd(1, 10, 2), upd(2, 10, 0), upd(3, 10, 1)]);
    }

    #[test]
    fn test_move_up_in_same_list_only_touches_range() {
        let lists = vec![list(10, &[1, 2, 3, 4, 5])];
        let diff = compute_diff(&lists, &same_list(4, 10, 3, 1)).unwrap();
        assert_eq!(diff, vec![upd(4, 10, 1), upd(2, 10, 2), upd(3, 10, 3)]);
    }

    #[test]
    fn test_move_to_own_index_is_empty() {
        let lists = vec![list(10, &[1, 2, 3])];
        assert!(compute_diff(&lists, &same_list(2, 10, 1, 1)).unwrap().is_empty());
        // Past-the-end in the own list clamps onto the last slot.
        assert!(compute_diff(&lists, &same_list(3, 10, 2, 7)).unwrap().is_empty());
    }

    #[test]
    fn test_cross_list_move_from_tail_leaves_source_untouched() {
        // [a, b] / [c], b to the head of the second list: a already holds
        // position 0, so the minimal diff has no source entry.
        let lists = vec![list(10, &[1, 2]), list(20, &[3])];
        let mv = PendingMove { card_id: 2, from_list_id: 10, to_list_id: 20, from_index: 1, to_index: 0 };
        let diff = compute_diff(&lists, &mv).unwrap();
        assert_eq!(diff, vec![upd(2, 20, 0), upd(3, 20, 1)]);
    }

    #[test]
    fn test_cross_list_move_compacts_source() {
        let lists = vec![list(10, &[1, 2]), list(20, &[3])];
        let mv = PendingMove { card_id: 1, from_list_id: 10, to_list_id: 20, from_index: 0, to_index: 0 };
        let diff = compute_diff(&lists, &mv).unwrap();
        assert_eq!(diff, vec![upd(1, 20, 0), upd(3, 20, 1), upd(2, 10, 0)]);
    }

    #[test]
    fn test_cross_list_into_empty_list() {
        let lists = vec![list(10, &[1, 2, 3]), list(20, &[])];
        let mv = PendingMove { card_id: 2, from_list_id: 10, to_list_id: 20, from_index: 1, to_index: 5 };
        let diff = compute_diff(&lists, &mv).unwrap();
        assert_eq!(diff, vec![upd(2, 20, 0), upd(3, 10, 1)]);
    }

    #[test]
    fn test_stale_move_is_rejected() {
        let lists = vec![list(10, &[1, 2])];
        let err = compute_diff(&lists, &same_list(2, 10, 0, 1)).unwrap_err();
        assert!(matches!(err, DomainError::UnresolvableTarget(_)));

        let mv = PendingMove { card_id: 1, from_list_id: 10, to_list_id: 99, from_index: 0, to_index: 0 };
        assert!(compute_diff(&lists, &mv).is_err());
    }

    #[test]
    fn test_apply_diff_moves_between_lists() {
        let mut board = Board::new(1, "b").with_lists(vec![list(10, &[1, 2]), list(20, &[3])]);
        apply_diff(&mut board, &[upd(2, 20, 0), upd(3, 20, 1)]).unwrap();

        assert_eq!(board.locate_card(2), Some((20, 0)));
        assert_eq!(board.locate_card(3), Some((20, 1)));
        assert_eq!(board.card(2).unwrap().list_id, 20);
        board.check_invariants().unwrap();
    }

    #[test]
    fn test_apply_incomplete_diff_fails() {
        let mut board = Board::new(1, "b").with_lists(vec![list(10, &[1, 2, 3])]);
        assert!(apply_diff(&mut board, &[upd(1, 10, 2)]).is_err());
    }

    /// Build the expected post-move board directly with ordering operations
    fn expected_after(board: &Board, mv: &PendingMove) -> Board {
        let mut expected = board.clone();
        let card = expected.remove_card(mv.card_id).unwrap();
        let destination = expected.list_mut(mv.to_list_id).unwrap();
        let max = destination.len();
        destination.insert_card(card, mv.to_index.min(max));
        expected
    }

    fn board_strategy() -> impl Strategy<Value = (Vec<usize>, usize, usize, usize, usize)> {
        proptest::collection::vec(0usize..6, 1..4).prop_flat_map(|sizes| {
            let n = sizes.len();
            (Just(sizes), 0..n, 0usize..6, 0..n, 0usize..8)
        })
    }

    proptest! {
        #[test]
        fn prop_applied_diff_matches_direct_move((sizes, from_list, from_raw, to_list, to_index) in board_strategy()) {
            let mut next_id = 1;
            let lists: Vec<List> = sizes
                .iter()
                .enumerate()
                .map(|(li, &n)| {
                    let ids: Vec<u32> = (0..n).map(|_| { next_id += 1; next_id }).collect();
                    let mut l = list(li as u32 + 1, &ids);
                    l.position = li as u32;
                    l
                })
                .collect();
            prop_assume!(sizes[from_list] > 0);

            let board = Board::new(1, "b").with_lists(lists);
            let from_index = from_raw % sizes[from_list];
            let source = &board.lists[from_list];
            let mv = PendingMove {
                card_id: source.cards[from_index].id,
                from_list_id: source.id,
                to_list_id: board.lists[to_list].id,
                from_index,
                to_index: if from_list == to_list { to_index.min(sizes[from_list] - 1) } else { to_index },
            };

            let diff = compute_diff(&board.lists, &mv).unwrap();
            let mut applied = board.clone();
            apply_diff(&mut applied, &diff).unwrap();

            prop_assert_eq!(&applied, &expected_after(&board, &mv));
            prop_assert!(applied.check_invariants().is_ok());
        }
    }
}
