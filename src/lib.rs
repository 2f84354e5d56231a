//! Kanban Board Client Core
//!
//! Drag-and-drop card reordering with optimistic commits, plus an API
//! client that recovers from expired access tokens with a single shared
//! refresh.

pub mod domain;
pub mod ordering;
pub mod dnd;
pub mod repository;
pub mod auth;
pub mod api;
pub mod config;
pub mod logging;

pub use api::KanbanServices;
pub use config::ClientConfig;
pub use dnd::BoardDragController;
pub use domain::{DomainError, DomainResult};
