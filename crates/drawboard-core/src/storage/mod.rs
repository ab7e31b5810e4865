//! Storage abstraction for persisting the board between sessions.

mod memory;
mod slot;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod web;

pub use memory::MemoryStorage;
pub use slot::{StorageSlot, create_storage, slot_key, SLOT_KEY_PREFIX};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use web::WebStorage;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Entry not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Which backend a board persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Lives as long as the page or process.
    #[default]
    Session,
    /// Survives restarts.
    Local,
    /// No persistence.
    None,
}

/// Trait for named-slot blob storage backends.
///
/// Writes are synchronous and best-effort from the board's point of view.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Load the value under `key`; `None` if absent.
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Remove the value under `key`. Removing a missing key is not an error.
    fn clear(&self, key: &str) -> StorageResult<()>;

    /// Check if a value exists.
    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.load(key)?.is_some())
    }
}

/// Trait for named-slot blob storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Load the value under `key`; `None` if absent.
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Remove the value under `key`. Removing a missing key is not an error.
    fn clear(&self, key: &str) -> StorageResult<()>;

    /// Check if a value exists.
    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.load(key)?.is_some())
    }
}
