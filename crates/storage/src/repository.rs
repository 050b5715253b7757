use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable string slots addressed by key.
///
/// A slot holds one serialized record; writers replace the whole value and
/// the last write wins.
#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be queried. A missing slot
    /// is `Ok(None)`, not an error.
    async fn read_slot(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn write_slot(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository with one slot already filled, for exercising load paths.
    #[must_use]
    pub fn with_slot(key: &str, value: &str) -> Self {
        let repo = Self::new();
        if let Ok(mut guard) = repo.slots.lock() {
            guard.insert(key.to_owned(), value.to_owned());
        }
        repo
    }
}

#[async_trait]
impl SlotRepository for InMemoryRepository {
    async fn read_slot(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .slots
            .lock()
            .map_err(|_| StorageError::Connection("poisoned lock".into()))?;
        Ok(guard.get(key).cloned())
    }

    async fn write_slot(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .slots
            .lock()
            .map_err(|_| StorageError::Connection("poisoned lock".into()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Aggregates the repositories the services need.
#[derive(Clone)]
pub struct Storage {
    pub slots: Arc<dyn SlotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            slots: Arc::new(InMemoryRepository::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_slot_reads_as_none() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.read_slot("progress").await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_replaces_previous_value() {
        let repo = InMemoryRepository::with_slot("progress", "{}");
        repo.write_slot("progress", r#"{"a":1}"#).await.unwrap();
        assert_eq!(
            repo.read_slot("progress").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert_eq!(repo.read_slot("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn storage_handles_share_the_backend() {
        let storage = Storage::in_memory();
        let other = storage.clone();
        storage.slots.write_slot("k", "v").await.unwrap();
        assert_eq!(other.slots.read_slot("k").await.unwrap().as_deref(), Some("v"));
    }
}
