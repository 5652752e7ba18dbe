//! Token storage backends
//!
//! Provides an in-memory store and a file-based store with atomic writes.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Key-value storage for session credentials
///
/// Reads and writes are individually atomic but not transactional across keys.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a single value
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every stored value
    async fn clear(&self) -> Result<()>;
}

/// In-memory store (no persistence)
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }

    /// Snapshot of everything currently stored
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// JSON file store
///
/// Entries are cached in memory and written through on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store at the given path, loading existing entries if present
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                Error::storage(format!("Failed to read session file: {e}"))
            })?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    Error::storage(format!("Failed to parse session file: {e}"))
                })?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::storage(format!("Failed to create session directory: {e}"))
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::storage(format!("Failed to serialize session: {e}")))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::storage(format!("Failed to write session file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::storage(format!("Failed to rename session file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.clear();
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(format!(
                "Failed to remove session file: {e}"
            ))),
        }
    }
}
