//! Web Storage implementation for WebAssembly.
//!
//! Uses the browser's `localStorage` or `sessionStorage`. Values are kept as
//! text: PNG payloads become `data:image/png;base64,` URLs, anything else must
//! be UTF-8.

use super::{Storage, StorageError, StorageResult};
use crate::snapshot::PNG_DATA_URL_PREFIX;
use base64::{Engine, engine::general_purpose::STANDARD};

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// `localStorage`/`sessionStorage`-backed storage.
///
/// Note: This is intentionally not Send/Sync since WASM is single-threaded
/// and the JS handle is not thread-safe.
pub struct WebStorage {
    area: web_sys::Storage,
}

impl WebStorage {
    /// Storage that survives page reloads and browser restarts.
    pub fn local() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        let area = window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))?;
        Ok(Self { area })
    }

    /// Storage scoped to the current tab.
    pub fn session() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        let area = window
            .session_storage()
            .map_err(|e| StorageError::Other(format!("sessionStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("sessionStorage not available".to_string()))?;
        Ok(Self { area })
    }
}

impl Storage for WebStorage {
    fn save(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let text = if value.starts_with(PNG_SIGNATURE) {
            format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(value))
        } else {
            std::str::from_utf8(value)
                .map_err(|e| StorageError::Serialization(e.to_string()))?
                .to_string()
        };
        // Quota errors surface here
        self.area
            .set_item(key, &text)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {:?}", key, e)))
    }

    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let item = self
            .area
            .get_item(key)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", key, e)))?;
        let Some(text) = item else {
            return Ok(None);
        };
        match text.strip_prefix(PNG_DATA_URL_PREFIX) {
            Some(encoded) => STANDARD
                .decode(encoded.trim())
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(Some(text.into_bytes())),
        }
    }

    fn clear(&self, key: &str) -> StorageResult<()> {
        self.area
            .remove_item(key)
            .map_err(|e| StorageError::Io(format!("Failed to delete {}: {:?}", key, e)))
    }
}
