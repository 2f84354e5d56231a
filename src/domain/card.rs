//! Card Entity
//!
//! The movable unit of a board. Belongs to exactly one list at a time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use crate::ordering::Positioned;

/// Free-form card attributes stored by the API alongside the card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCustom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

/// A card on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier
    pub id: u32,
    pub title: String,
    /// Owning list; must match the list that holds the card
    pub list_id: u32,
    /// Dense, zero-based position within the owning list
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CardCustom>,
    /// Assigned members
    #[serde(default, rename = "users")]
    pub member_ids: BTreeSet<u32>,
}

impl Card {
    pub fn new(id: u32, title: impl Into<String>, list_id: u32, position: u32) -> Self {
        Self {
            id,
            title: title.into(),
            list_id,
            position,
            description: None,
            color: None,
            custom: None,
            member_ids: BTreeSet::new(),
        }
    }
}

impl Entity for Card {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Positioned for Card {
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
    fn test_card_from_api_payload() {
        let card: Card = serde_json::from_str(
            r#"{"id":7,"title":"Write docs","list_id":3,"position":1,"users":[4,2],"custom":{"deadline":"2024-05-01"}}"#,
        )
        .unwrap();
        assert_eq!(card.id(), 7);
        assert_eq!(card.list_id, 3);
        assert_eq!(card.member_ids.iter().copied().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(card.custom.unwrap().deadline.as_deref(), Some("2024-05-01"));
        assert!(card.description.is_none());
    }
}
