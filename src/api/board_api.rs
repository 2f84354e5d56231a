//! Board Service
//!
//! Typed wrappers over the board, list and card endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::transport::ApiRequest;
use crate::dnd::PositionUpdate;
use crate::domain::{validate_title, Board, BoardCustom, Card, DomainResult, List};
use crate::repository::BoardRepository;

// ========================
// Argument Structs
// ========================

#[derive(Debug, Clone, Serialize)]
pub struct CreateBoardData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<BoardCustom>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateBoardData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<BoardCustom>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateListData {
    pub title: String,
    pub position: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateListData {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCardData {
    pub title: String,
    pub list_id: u32,
    pub position: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateCardData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateCardUsersData {
    pub add: Vec<u32>,
    pub remove: Vec<u32>,
}

#[derive(Deserialize)]
struct BoardsEnvelope {
    #[serde(default)]
    boards: Vec<Board>,
}

// ========================
// Service
// ========================

pub struct BoardApi {
    client: Arc<ApiClient>,
}

impl BoardApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn get_boards(&self) -> DomainResult<Vec<Board>> {
        let envelope: BoardsEnvelope = self.client.execute_json(ApiRequest::get("/board")).await?;
        Ok(envelope.boards)
    }

    pub async fn get_board(&self, board_id: u32) -> DomainResult<Board> {
        let board: Board = self
            .client
            .execute_json(ApiRequest::get(format!("/board/{}", board_id)))
            .await?;
        Ok(board.normalized())
    }

    pub async fn create_board(&self, title: &str, background: Option<Vec<String>>) -> DomainResult<Board> {
        let data = CreateBoardData {
            title: validate_title(title)?,
            custom: background.map(|background| BoardCustom { background }),
        };
        self.client.execute_json(ApiRequest::post("/board", &data)?).await
    }

    pub async fn update_board(&self, board_id: u32, data: &UpdateBoardData) -> DomainResult<Board> {
        self.client
            .execute_json(ApiRequest::put(format!("/board/{}", board_id), data)?)
            .await
    }

    /// Rename a board. Empty or unchanged titles are a no-op.
    pub async fn rename_board(&self, board: &Board, title: &str) -> DomainResult<Option<Board>> {
        let trimmed = title.trim();
        if trimmed.is_empty() || trimmed == board.title {
            return Ok(None);
        }
        let data = UpdateBoardData {
            title: Some(validate_title(trimmed)?),
            custom: None,
        };
        self.update_board(board.id, &data).await.map(Some)
    }

    pub async fn set_background(&self, board: &Board, background: Vec<String>) -> DomainResult<Board> {
        let data = UpdateBoardData {
            title: None,
            custom: Some(BoardCustom { background }),
        };
        self.update_board(board.id, &data).await
    }

    /// Append a list at the end of the board
    pub async fn create_list(&self, board: &Board, title: &str) -> DomainResult<List> {
        let data = CreateListData {
            title: validate_title(title)?,
            position: board.next_list_position(),
        };
        self.client
            .execute_json(ApiRequest::post(format!("/board/{}/list", board.id), &data)?)
            .await
    }

    pub async fn update_list(&self, board_id: u32, list_id: u32, title: &str) -> DomainResult<List> {
        let data = UpdateListData {
            title: validate_title(title)?,
        };
        self.client
            .execute_json(ApiRequest::put(format!("/board/{}/list/{}", board_id, list_id), &data)?)
            .await
    }

    /// Append a card at the end of `list`
    pub async fn create_card(
        &self,
        board_id: u32,
        list: &List,
        title: &str,
        description: Option<String>,
    ) -> DomainResult<Card> {
        let data = CreateCardData {
            title: validate_title(title)?,
            list_id: list.id,
            position: list.len() as u32,
            description,
        };
        self.client
            .execute_json(ApiRequest::post(format!("/board/{}/card", board_id), &data)?)
            .await
    }

    pub async fn update_card(&self, board_id: u32, card_id: u32, data: &UpdateCardData) -> DomainResult<Card> {
        self.client
            .execute_json(ApiRequest::put(format!("/board/{}/card/{}", board_id, card_id), data)?)
            .await
    }

    /// The batched position write: one call per committed drag
    pub async fn move_cards(&self, board_id: u32, updates: &[PositionUpdate]) -> DomainResult<()> {
        self.client
            .execute_unit(ApiRequest::put(format!("/board/{}/card", board_id), updates)?)
            .await
    }

    pub async fn delete_card(&self, board_id: u32, card_id: u32) -> DomainResult<()> {
        self.client
            .execute_unit(ApiRequest::delete(format!("/board/{}/card/{}", board_id, card_id)))
            .await
    }

    pub async fn update_card_users(&self, board_id: u32, card_id: u32, data: &UpdateCardUsersData) -> DomainResult<()> {
        self.client
            .execute_unit(ApiRequest::put(format!("/board/{}/card/{}/users", board_id, card_id), data)?)
            .await
    }
}

#[async_trait]
impl BoardRepository for BoardApi {
    async fn fetch_board(&self, board_id: u32) -> DomainResult<Board> {
        self.get_board(board_id).await
    }

    async fn persist_move(&self, board_id: u32, updates: &[PositionUpdate]) -> DomainResult<Option<Board>> {
        self.move_cards(board_id, updates).await?;
        Ok(None)
    }
}
