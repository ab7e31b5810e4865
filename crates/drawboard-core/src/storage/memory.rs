//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for session persistence and tests.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn clear(&self, key: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();

        storage.save("test", b"abc").unwrap();
        let loaded = storage.load("test").unwrap();

        assert_eq!(loaded.as_deref(), Some(&b"abc"[..]));
    }

    #[test]
    fn test_missing_is_none() {
        let storage = MemoryStorage::new();
        assert!(storage.load("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_exists() {
        let storage = MemoryStorage::new();

        assert!(!storage.exists("test").unwrap());
        storage.save("test", b"x").unwrap();
        assert!(storage.exists("test").unwrap());
    }

    #[test]
    fn test_clear() {
        let storage = MemoryStorage::new();

        storage.save("test", b"x").unwrap();
        storage.clear("test").unwrap();
        assert!(!storage.exists("test").unwrap());
        // Clearing again is fine
        storage.clear("test").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_save_overwrites() {
        let storage = MemoryStorage::new();

        storage.save("slot", b"one").unwrap();
        storage.save("slot", b"two").unwrap();

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.load("slot").unwrap(), Some(b"two".to_vec()));
    }
}
