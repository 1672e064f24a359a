//! Storage for the single session bearer token.
//!
//! # Design
//! The store is injected into `ApiClient` as `Arc<dyn TokenStore>` so tests
//! can hand each client its own `MemoryTokenStore` instead of sharing global
//! state. Writes are last-write-wins; there is never more than one token.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::ApiError;

const TOKEN_FILE_NAME: &str = "session-token";
const APP_DIR_NAME: &str = "gym-admin";

/// Synchronous storage for zero or one bearer token.
///
/// Tokens are kept byte for byte. An empty token reads back as `None` in
/// every store.
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when logged out.
    fn get_token(&self) -> Option<String>;

    /// Store `token`, replacing any previous value. The shape is not checked.
    fn set_token(&self, token: &str) -> Result<(), ApiError>;

    /// Clear the token. Removing an absent token is a no-op.
    fn remove_token(&self) -> Result<(), ApiError>;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `token`.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get_token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|t| !t.is_empty())
    }

    fn set_token(&self, token: &str) -> Result<(), ApiError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn remove_token(&self) -> Result<(), ApiError> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}

/// Token store backed by a file, so the session survives restarts.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/gym-admin/session-token`.
    pub fn default_path() -> Result<PathBuf, ApiError> {
        let dir = dirs::config_dir()
            .ok_or_else(|| ApiError::Storage("could not determine config directory".to_string()))?;
        Ok(dir.join(APP_DIR_NAME).join(TOKEN_FILE_NAME))
    }

    /// Store at `default_path()`.
    pub fn open_default() -> Result<Self, ApiError> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get_token(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.is_empty() => None,
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read token file: {e}");
                None
            }
        }
    }

    fn set_token(&self, token: &str) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ApiError::Storage(e.to_string()))?;
        }
        fs::write(&self.path, token).map_err(|e| ApiError::Storage(e.to_string()))
    }

    fn remove_token(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Storage(e.to_string())),
        }
    }
}
