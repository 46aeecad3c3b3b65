//! Sessions stored on disk, one subdirectory per session id

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use guide_core::Message;
use tokio::fs;

use crate::error::Result;
use crate::manager::load_entry;
use crate::storage::{FileSessionStore, MESSAGES_KEY};
use crate::structs::{SessionListing, SessionsOverview};

#[derive(Debug, Clone)]
pub struct SessionDirectory {
    root: PathBuf,
}

impl SessionDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File store for the session named `session_id`
    pub fn store(&self, session_id: &str) -> FileSessionStore {
        FileSessionStore::new(self.root.join(session_id))
    }

    /// Session ids in name order. A missing root means no sessions yet.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(id) => ids.push(id),
                Err(name) => tracing::debug!("Skipping non UTF-8 session dir {:?}", name),
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Message totals per session and across all of them. Unreadable logs
    /// count as empty sessions.
    pub async fn overview(&self) -> Result<SessionsOverview> {
        let mut overview = SessionsOverview::default();

        for session_id in self.list().await? {
            let store = self.store(&session_id);
            let total_messages = load_entry::<_, Vec<Message>>(&store, MESSAGES_KEY, &session_id)
                .await
                .map_or(0, |messages| messages.len());

            overview.total_sessions += 1;
            overview.total_messages += total_messages;
            overview.sessions.push(SessionListing {
                session_id,
                total_messages,
            });
        }

        tracing::debug!(
            sessions = overview.total_sessions,
            messages = overview.total_messages,
            "Scanned {}",
            self.root.display()
        );
        Ok(overview)
    }
}
