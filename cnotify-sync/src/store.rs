//! Durable local storage for subscription state.
//!
//! Two records live under the storage directory: the last-synced audience
//! fingerprint, and the legacy plain topic-name list. The fingerprint record
//! drives drift detection; the topic list is superseded by it but still
//! written after a successful cycle so older tooling keeps working.

use crate::error::{SyncError, SyncResult};
use crate::fingerprint::AudienceFingerprint;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// File name of the persisted fingerprint record.
const METADATA_FILE: &str = "cnotify_subscribed_metadata.json";

/// File name of the legacy subscribed-topics record.
const TOPICS_FILE: &str = "cnotify_subscribed_topics.json";

/// Resolves the default storage directory: `$HOME/.cnotify`.
pub fn default_storage_dir() -> SyncResult<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| SyncError::Config("HOME environment variable not set".to_string()))?;
    Ok(PathBuf::from(home).join(".cnotify"))
}

/// Persists the last fingerprint for which a subscribe transition completed.
///
/// The record is absent until the first successful reconciliation, is
/// overwritten on each later one, and is never deleted by this engine.
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    path: PathBuf,
}

impl FingerprintStore {
    /// Creates a store rooted at the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(METADATA_FILE),
        }
    }

    /// Reads the persisted fingerprint.
    ///
    /// Returns `None` when no record exists or the stored data fails to
    /// parse: a corrupt record is treated as absent state, never as an
    /// error the caller has to handle.
    pub async fn load(&self) -> Option<AudienceFingerprint> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No persisted fingerprint at {:?}: {e}", self.path);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                warn!("Persisted fingerprint unparseable, treating as absent: {e}");
                None
            }
        }
    }

    /// Serializes and overwrites the persisted fingerprint.
    ///
    /// Writes to a temp file in the same directory and renames it over the
    /// target, so a single caller never observes a partial record.
    pub async fn save(&self, fingerprint: &AudienceFingerprint) -> SyncResult<()> {
        let raw = serde_json::to_vec(fingerprint)?;
        write_atomic(&self.path, &raw).await
    }
}

/// Persists the plain topic-name list under its legacy key.
#[derive(Debug, Clone)]
pub struct TopicListStore {
    path: PathBuf,
}

impl TopicListStore {
    /// Creates a store rooted at the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOPICS_FILE),
        }
    }

    /// Reads the persisted topic list; absent or unparseable data yields an
    /// empty list.
    pub async fn load(&self) -> Vec<String> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&raw) {
            Ok(topics) => topics,
            Err(e) => {
                warn!("Persisted topic list unparseable, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Serializes and overwrites the persisted topic list.
    pub async fn save(&self, topics: &[String]) -> SyncResult<()> {
        let raw = serde_json::to_vec(&topics)?;
        write_atomic(&self.path, &raw).await
    }
}

/// Writes `content` to `path` via a temp file and rename.
async fn write_atomic(path: &Path, content: &[u8]) -> SyncResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| SyncError::Storage(format!("no parent directory for {path:?}")))?;

    if !dir.exists() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| SyncError::Storage(format!("failed to create storage dir: {e}")))?;
        debug!("Created storage directory: {dir:?}");
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)
        .await
        .map_err(|e| SyncError::Storage(format!("failed to write record: {e}")))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| SyncError::Storage(format!("failed to commit record: {e}")))?;

    Ok(())
}
