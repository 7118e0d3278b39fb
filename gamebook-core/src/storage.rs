//! Key/value persistence the sheet autosaves into.
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Key the sheet is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "gamebook.sheet";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Browser-style local storage: string values under string keys.
/// Platform hosts provide the implementation.
pub trait StateStorage {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the removal.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage. Clones share contents, so a test can keep a handle
/// after boxing one into a manager.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with one entry; not counted as a write.
    #[must_use]
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        storage
    }

    /// Number of successful `set_item` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl StateStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}
