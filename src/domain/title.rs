//! Title Validation
//!
//! Board, list and card titles share one rule set.

use std::sync::OnceLock;

use regex::Regex;

use super::entity::{DomainError, DomainResult};

fn title_pattern() -> DomainResult<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Zа-яА-ЯґҐєЄіІїЇ0-9 ._-]+$").ok())
        .as_ref()
        .ok_or_else(|| DomainError::Internal("title pattern failed to compile".to_string()))
}

/// Validate a title and return it trimmed
pub fn validate_title(title: &str) -> DomainResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput("title must not be empty".to_string()));
    }
    if !title_pattern()?.is_match(title) {
        return Err(DomainError::InvalidInput(
            "title may only contain letters, digits, spaces, dashes, dots and underscores".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
