//! Error types for the subscription engine.

use thiserror::Error;

/// Result type for subscription operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in subscription operations.
///
/// Only construction-time misconfiguration is surfaced to callers as an
/// `Err`. Failures inside a running reconcile cycle are absorbed into
/// [`ReconcileOutcome`](crate::ReconcileOutcome) and logged.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid or missing configuration (fatal, raised at construction).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Messaging provider error (registration token acquisition).
    #[error("messaging provider error: {0}")]
    Messaging(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
