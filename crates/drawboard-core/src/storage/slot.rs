//! A board's named persistence slot.
//!
//! The slot stores the flattened raster as PNG bytes under
//! `drawing-board-{id}`. Text backends keep them as a PNG data URL, the form a
//! browser canvas produces, and the slot reads either.

use crate::snapshot::{PNG_DATA_URL_PREFIX, Snapshot};
use crate::storage::{MemoryStorage, Storage, StorageError, StorageKind, StorageResult};
use std::sync::Arc;

/// Prefix of every board slot key.
pub const SLOT_KEY_PREFIX: &str = "drawing-board-";

/// Storage key for the board with `id`.
pub fn slot_key(id: &str) -> String {
    format!("{}{}", SLOT_KEY_PREFIX, id)
}

/// Persists snapshots for one board.
pub struct StorageSlot {
    storage: Arc<dyn Storage>,
    key: String,
}

impl StorageSlot {
    /// Create a slot for the board with `id`.
    pub fn new(storage: Arc<dyn Storage>, id: &str) -> Self {
        Self {
            storage,
            key: slot_key(id),
        }
    }

    /// The storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Write `snapshot`, replacing the previous value.
    pub fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        self.storage.save(&self.key, snapshot.as_bytes())
    }

    /// Read the stored snapshot, if any.
    pub fn load(&self) -> StorageResult<Option<Snapshot>> {
        let Some(bytes) = self.storage.load(&self.key)? else {
            return Ok(None);
        };
        let snapshot = if bytes.starts_with(PNG_DATA_URL_PREFIX.as_bytes()) {
            let url = std::str::from_utf8(&bytes)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            Snapshot::from_data_url(url)
        } else {
            Snapshot::from_png(&bytes)
        };
        snapshot
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Check if a snapshot is stored.
    pub fn exists(&self) -> StorageResult<bool> {
        self.storage.exists(&self.key)
    }

    /// Remove the stored snapshot.
    pub fn clear(&self) -> StorageResult<()> {
        self.storage.clear(&self.key)
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

/// Create the backend for `kind`; `None` disables persistence.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_storage(kind: StorageKind) -> StorageResult<Option<Arc<dyn Storage>>> {
    let storage: Arc<dyn Storage> = match kind {
        StorageKind::Session => Arc::new(MemoryStorage::new()),
        StorageKind::Local => Arc::new(crate::storage::FileStorage::default_location()?),
        StorageKind::None => return Ok(None),
    };
    Ok(Some(storage))
}

/// Create the backend for `kind`; `None` disables persistence.
#[cfg(target_arch = "wasm32")]
pub fn create_storage(kind: StorageKind) -> StorageResult<Option<Arc<dyn Storage>>> {
    let storage: Arc<dyn Storage> = match kind {
        StorageKind::Session => match crate::storage::WebStorage::session() {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                log::warn!("sessionStorage unavailable, keeping board in memory: {}", e);
                Arc::new(MemoryStorage::new())
            }
        },
        StorageKind::Local => Arc::new(crate::storage::WebStorage::local()?),
        StorageKind::None => return Ok(None),
    };
    Ok(Some(storage))
}
