//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! No I/O happens here.

mod entity;
mod card;
mod list;
mod board;
mod user;
mod title;

pub use entity::{Entity, DomainError, DomainResult, ReportKind};
pub use card::{Card, CardCustom};
pub use list::List;
pub use board::{Board, BoardCustom};
pub use user::{User, TokenPair, LoginData, RegisterData};
pub use title::validate_title;
