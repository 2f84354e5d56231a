//! List Entity
//!
//! An ordered container of cards within a board.

use serde::{Deserialize, Serialize};

use super::card::Card;
use super::entity::Entity;
use crate::ordering::{OrderedCollection, Positioned};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: u32,
    pub title: String,
    /// Dense ordering among the board's lists
    pub position: u32,
    /// Sorted ascending by `position`
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl List {
    pub fn new(id: u32, title: impl Into<String>, position: u32) -> Self {
        Self {
            id,
            title: title.into(),
            position,
            cards: Vec::new(),
        }
    }

    /// Builder-style helper; appends `cards` in order and renumbers them
    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        for card in cards {
            let index = self.cards.len();
            self.insert_card(card, index);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card_index(&self, card_id: u32) -> Option<usize> {
        self.cards.index_of(card_id)
    }

    /// Splice `card` in at `index` (clamped to the end), taking ownership of it
    pub fn insert_card(&mut self, mut card: Card, index: usize) -> usize {
        card.list_id = self.id;
        self.cards.insert_at(card, index)
    }

    /// Remove a card and close the gap it leaves
    pub fn remove_card(&mut self, card_id: u32) -> Option<Card> {
        self.cards.remove_by_id(card_id)
    }

    /// Sort by stored position, fix ownership and renumber densely
    pub fn normalize(&mut self) {
        self.cards.sort_by_position();
        let id = self.id;
        for card in &mut self.cards {
            card.list_id = id;
        }
        self.cards.reindex();
    }
}

impl Entity for List {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Positioned for List {
    fn position(&self) -> u32 {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_card_takes_ownership() {
        let mut list = List::new(2, "Doing", 0).with_cards(vec![Card::new(1, "a", 2, 0)]);
        let stray = Card::new(9, "moved in", 5, 4);
        list.insert_card(stray, 0);

        assert_eq!(list.cards[0].id, 9);
        assert_eq!(list.cards[0].list_id, 2);
        assert_eq!(list.cards[0].position, 0);
        assert_eq!(list.cards[1].position, 1);
    }

    #[test]
    fn test_normalize_sorts_and_fills_gaps() {
        let mut list = List::new(1, "Todo", 0);
        list.cards = vec![Card::new(3, "c", 1, 7), Card::new(1, "a", 1, 0), Card::new(2, "b", 4, 3)];
        list.normalize();

        let ids: Vec<u32> = list.cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(list.cards.is_dense());
        assert!(list.cards.iter().all(|c| c.list_id == 1));
    }

    #[test]
    fn test_remove_card_compacts() {
        let mut list = List::new(1, "Todo", 0).with_cards(vec![
            Card::new(1, "a", 1, 0),
            Card::new(2, "b", 1, 0),
            Card::new(3, "c", 1, 0),
        ]);
        let removed = list.remove_card(2).unwrap();
        assert_eq!(removed.id, 2);
        assert_eq!(list.cards[1].id, 3);
        assert_eq!(list.cards[1].position, 1);
        assert!(list.remove_card(42).is_none());
    }
}
