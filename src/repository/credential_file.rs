//! File-Backed Credential Store
//!
//! Keeps the token pair in a small JSON file so a session survives restarts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use super::traits::CredentialStore;
use crate::domain::{DomainError, DomainResult, TokenPair};

pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write of the file.
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> DomainResult<Option<TokenPair>> {
        let _guard = self.lock.lock().await;
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| DomainError::Internal(format!("Failed to read credentials: {}", e)))?;
        match serde_json::from_str(&content) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring unreadable credentials file: {}", e);
                Ok(None)
            }
        }
    }

    async fn store(&self, tokens: &TokenPair) -> DomainResult<()> {
        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Internal(format!("Failed to create credentials dir: {}", e)))?;
        }
        let json = serde_json::to_string(tokens)?;
        std::fs::write(&self.path, json)
            .map_err(|e| DomainError::Internal(format!("Failed to write credentials: {}", e)))
    }

    async fn clear(&self) -> DomainResult<()> {
        let _guard = self.lock.lock().await;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Internal(format!("Failed to remove credentials: {}", e))),
        }
    }
}
