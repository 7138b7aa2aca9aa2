//! Messaging provider boundary.
//!
//! The push-messaging provider issues the registration token that
//! identifies this device to the audience service. Token issuance itself is
//! outside this engine; only the acquisition seam is modeled here.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

/// Supplies the device registration token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Acquires the current registration token. A failure here aborts the
    /// running reconcile cycle; it is never fatal to the process.
    async fn registration_token(&self) -> SyncResult<String>;
}

/// A provider returning a fixed token supplied at construction.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Creates a provider for a non-empty token.
    pub fn new(token: impl Into<String>) -> SyncResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SyncError::Config(
                "registration token must not be empty".to_string(),
            ));
        }
        Ok(Self { token })
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn registration_token(&self) -> SyncResult<String> {
        Ok(self.token.clone())
    }
}

/// A provider reading the token from a file on each acquisition, so a
/// rotated token is picked up without reconstructing the controller.
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    /// Creates a provider for an existing token file.
    pub fn new(path: impl Into<PathBuf>) -> SyncResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(SyncError::Config(format!(
                "registration token file not found: {path:?}"
            )));
        }
        Ok(Self { path })
    }
}

#[async_trait]
impl TokenProvider for FileTokenProvider {
    async fn registration_token(&self) -> SyncResult<String> {
        let raw = fs::read_to_string(&self.path)
            .await
            .map_err(|e| SyncError::Messaging(format!("failed to read token file: {e}")))?;

        let token = raw.trim();
        if token.is_empty() {
            return Err(SyncError::Messaging(format!(
                "token file {:?} is empty",
                self.path
            )));
        }
        Ok(token.to_string())
    }
}

/// How the controller obtains its token provider.
///
/// Validated exhaustively at construction: every arm yields either a ready
/// provider or a descriptive configuration error.
pub enum TokenSource {
    /// A caller-owned, already-initialized provider.
    Provider(Arc<dyn TokenProvider>),
    /// A fixed registration token supplied inline.
    Token(String),
    /// Path to a file whose trimmed contents are the token.
    TokenFile(PathBuf),
}

impl TokenSource {
    /// Resolves the source into a ready provider.
    pub fn into_provider(self) -> SyncResult<Arc<dyn TokenProvider>> {
        match self {
            Self::Provider(provider) => Ok(provider),
            Self::Token(token) => Ok(Arc::new(StaticTokenProvider::new(token)?)),
            Self::TokenFile(path) => Ok(Arc::new(FileTokenProvider::new(path)?)),
        }
    }
}
