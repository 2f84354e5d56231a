//! Board Entity
//!
//! Top-level container of ordered lists.

use serde::{Deserialize, Serialize};

use super::card::Card;
use super::entity::{DomainError, DomainResult, Entity};
use super::list::List;
use crate::ordering::OrderedCollection;

/// Board appearance settings; `background` holds CSS background values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCustom {
    #[serde(default)]
    pub background: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub custom: BoardCustom,
    #[serde(default)]
    pub lists: Vec<List>,
}

impl Board {
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            custom: BoardCustom::default(),
            lists: Vec::new(),
        }
    }

    pub fn with_lists(mut self, lists: Vec<List>) -> Self {
        self.lists = lists;
        self
    }

    /// Bring a board received from the API into canonical in-memory form
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn normalize(&mut self) {
        self.lists.sort_by_position();
        self.lists.reindex();
        for list in &mut self.lists {
            list.normalize();
        }
    }

    pub fn list(&self, list_id: u32) -> Option<&List> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    pub fn list_mut(&mut self, list_id: u32) -> Option<&mut List> {
        self.lists.iter_mut().find(|l| l.id == list_id)
    }

    /// Locate a card: (list id, index within list)
    pub fn locate_card(&self, card_id: u32) -> Option<(u32, usize)> {
        self.lists
            .iter()
            .find_map(|list| list.card_index(card_id).map(|index| (list.id, index)))
    }

    pub fn card(&self, card_id: u32) -> Option<&Card> {
        self.lists
            .iter()
            .flat_map(|l| l.cards.iter())
            .find(|c| c.id == card_id)
    }

    /// Remove a card from whichever list holds it
    pub fn remove_card(&mut self, card_id: u32) -> Option<Card> {
        let (list_id, _) = self.locate_card(card_id)?;
        self.list_mut(list_id)?.remove_card(card_id)
    }

    /// Next free list position (lists are appended at the end)
    pub fn next_list_position(&self) -> u32 {
        self.lists.len() as u32
    }

    /// Check the dense-ordering and ownership invariants on every list
    pub fn check_invariants(&self) -> DomainResult<()> {
        if !self.lists.is_dense() {
            return Err(DomainError::Internal(format!("board {} lists are not densely ordered", self.id)));
        }
        for list in &self.lists {
            if !list.cards.is_dense() {
                return Err(DomainError::Internal(format!("list {} cards are not densely ordered", list.id)));
            }
            if let Some(card) = list.cards.iter().find(|c| c.list_id != list.id) {
                return Err(DomainError::Internal(format!(
                    "card {} claims list {} but is held by list {}",
                    card.id, card.list_id, list.id
                )));
            }
        }
        Ok(())
    }
}

impl Entity for Board {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}
