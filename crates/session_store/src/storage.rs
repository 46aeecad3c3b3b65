//! Session storage trait and implementations
//!
//! A store is a flat key-value space of JSON blobs. Each chat session uses two
//! entries, [`MESSAGES_KEY`] and [`CONTEXT_KEY`].

use crate::error::{Result, SessionError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

/// Entry holding the JSON message log
pub const MESSAGES_KEY: &str = "messages";
/// Entry holding the JSON user context
pub const CONTEXT_KEY: &str = "context";

/// Key-value persistence for session blobs
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load an entry, `None` when it was never written or has been removed
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Write an entry, replacing any previous value
    async fn save(&self, key: &str, blob: &str) -> Result<()>;

    /// Remove an entry; removing a missing entry is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SessionError::Validation(format!("invalid store key '{}'", key)))
    }
}

/// File-based store: one `<key>.json` file per entry
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        match fs::read_to_string(self.entry_path(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, blob: &str) -> Result<()> {
        validate_key(key)?;
        fs::create_dir_all(&self.base_path).await?;

        // Write then rename so a crash never leaves a half-written entry
        let path = self.entry_path(key);
        let tmp_path = self.base_path.join(format!(".{}.json.tmp", key));
        fs::write(&tmp_path, blob).await?;
        fs::rename(&tmp_path, &path).await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, blob: &str) -> Result<()> {
        validate_key(key)?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}
