//! Async key-value store adapter
//!
//! Values are serialized to JSON text. `get` never fails: a missing key, an
//! unreadable value and a backend error all come back as `None` (logged).
//! `try_get` and the writes return the error to the caller.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use super::backend::{KvBackend, MemoryBackend, SqliteBackend};
use super::error::{StorageError, StorageResult};

/// Async handle over a shared [`KvBackend`]
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<dyn KvBackend>,
}

impl KvStore {
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn from_backend(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Open the SQLite store at `path`
    pub fn open_sqlite(path: &Path) -> StorageResult<Self> {
        Ok(Self::new(SqliteBackend::open(path)?))
    }

    /// A fresh store that lives only as long as this handle
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    async fn run<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn KvBackend) -> StorageResult<T> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || f(backend.as_ref())).await?
    }

    /// Serialize `value` and store it under `key`
    pub async fn set<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let result = match serde_json::to_string(value) {
            Ok(text) => {
                let owned_key = key.to_string();
                self.run(move |backend| backend.set(&owned_key, &text)).await
            }
            Err(source) => Err(StorageError::Serialization {
                key: key.to_string(),
                source,
            }),
        };

        match &result {
            Ok(()) => debug!("Saved value for key {}", key),
            Err(e) => error!("Error saving data for key {}: {}", key, e),
        }
        result
    }

    /// Read and deserialize the value under `key`
    ///
    /// Returns `None` when the key is missing or the read fails.
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                error!("Error loading data for key {}: {}", key, e);
                None
            }
        }
    }

    /// Read and deserialize the value under `key`, returning read errors
    ///
    /// `Ok(None)` means the key is missing. Writers that rebuild a value from
    /// its current contents use this so an unreadable value is never taken
    /// for an empty one.
    pub async fn try_get<T>(&self, key: &str) -> StorageResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let owned_key = key.to_string();
        let Some(text) = self.run(move |backend| backend.get(&owned_key)).await? else {
            debug!("No value stored for key {}", key);
            return Ok(None);
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StorageError::Serialization {
                key: key.to_string(),
                source,
            })
    }

    /// Delete `key`
    pub async fn remove(&self, key: &str) -> StorageResult<()> {
        let owned_key = key.to_string();
        let result = self.run(move |backend| backend.remove(&owned_key)).await;
        if let Err(e) = &result {
            error!("Error removing data for key {}: {}", key, e);
        }
        result
    }

    /// Delete every key in the store
    pub async fn clear(&self) -> StorageResult<()> {
        let result = self.run(|backend| backend.clear()).await;
        if let Err(e) = &result {
            error!("Error clearing storage: {}", e);
        }
        result
    }

    /// List stored keys, or an empty list if the backend fails
    pub async fn list_keys(&self) -> Vec<String> {
        match self.run(|backend| backend.keys()).await {
            Ok(keys) => keys,
            Err(e) => {
                error!("Error getting keys: {}", e);
                Vec::new()
            }
        }
    }
}
