//! In-memory storage for unit testing.
//!
//! Holds the *encoded* TOML text rather than a `Document`, so a save followed
//! by a load goes through the same codec as [`super::file::FileStorage`] and
//! exposes the same drift, if any.  Saves and loads are counted so tests can
//! assert that a no-op mutation never touched persistence.  A poisoned lock
//! (a panicking test thread) does not make the storage unusable.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{DocumentStorage, StorageError};
use crate::domain::document::Document;

/// A [`DocumentStorage`] that keeps the encoded document in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    content: Mutex<Option<String>>,
    saves: Mutex<u32>,
    loads: Mutex<u32>,
}

impl MemoryStorage {
    /// Creates storage with nothing persisted; `load` fails until the first
    /// save, mirroring a missing file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage already holding `text` as the persisted document.
    pub fn with_content(text: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(Some(text.into())),
            ..Self::default()
        }
    }

    /// Replaces the persisted text, as an external writer would.
    pub fn set_content(&self, text: impl Into<String>) {
        *lock(&self.content) = Some(text.into());
    }

    /// Returns the persisted text, if any.
    pub fn content(&self) -> Option<String> {
        lock(&self.content).clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> u32 {
        *lock(&self.saves)
    }

    /// Number of completed loads.
    pub fn load_count(&self) -> u32 {
        *lock(&self.loads)
    }
}

impl DocumentStorage for MemoryStorage {
    fn load(&self) -> Result<Document, StorageError> {
        let content = self.content().ok_or_else(|| StorageError::Io {
            path: "<memory>".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "nothing persisted"),
        })?;
        let document: Document = toml::from_str(&content)?;
        *lock(&self.loads) += 1;
        Ok(document)
    }

    fn save(&self, document: &Document) -> Result<(), StorageError> {
        let text = toml::to_string_pretty(document)?;
        self.set_content(text);
        *lock(&self.saves) += 1;
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::Value;

    #[test]
    fn test_empty_memory_storage_fails_to_load() {
        let storage = MemoryStorage::new();

        assert!(matches!(storage.load(), Err(StorageError::Io { .. })));
        assert_eq!(storage.load_count(), 0);
    }

    #[test]
    fn test_memory_storage_round_trips_through_toml() {
        // Arrange
        let storage = MemoryStorage::new();
        let mut doc = Document::new();
        doc.insert("permit_join".to_string(), Value::Boolean(true));

        // Act
        storage.save(&doc).unwrap();
        let loaded = storage.load().unwrap();

        // Assert
        assert_eq!(loaded, doc);
        assert_eq!(storage.save_count(), 1);
        assert_eq!(storage.load_count(), 1);
        assert!(storage.content().unwrap().contains("permit_join = true"));
    }

    #[test]
    fn test_memory_storage_survives_poisoned_lock() {
        // Arrange: a thread panics while holding the save counter
        let storage = std::sync::Arc::new(MemoryStorage::new());
        let shared = std::sync::Arc::clone(&storage);
        let joined = std::thread::spawn(move || {
            let _guard = shared.saves.lock().unwrap();
            panic!("test thread failure while holding the lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(storage.saves.is_poisoned());

        // Act
        storage.save(&Document::new()).unwrap();

        // Assert
        assert_eq!(storage.save_count(), 1);
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_memory_storage_reports_parse_errors() {
        let storage = MemoryStorage::with_content("permit_join = ");

        assert!(matches!(storage.load(), Err(StorageError::Parse(_))));
    }
}
