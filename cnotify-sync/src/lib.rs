//! Push-notification audience subscription engine for CNotify.
//!
//! Keeps a device's topic subscriptions in sync with a locally-derived
//! audience fingerprint (language, platform, country, app version).
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Fingerprint**: derives the canonical audience fingerprint from the
//!   host locale signal and the configured app version
//! - **Compare**: structural deep equality, the sole drift signal
//! - **Store**: persists the last-synced fingerprint in durable local
//!   storage
//! - **Gateway**: performs subscribe/unsubscribe calls against the remote
//!   audience service and classifies outcomes
//! - **Controller**: orchestrates permission acquisition, drift detection,
//!   and the transactional subscribe/unsubscribe sequence
//!
//! ## Reconcile cycle
//!
//! 1. **Permission**: ask the host for notification permission
//! 2. **Generate**: derive the current fingerprint
//! 3. **Compare**: load the persisted fingerprint and check for drift
//! 4. **Transition**: on drift, unsubscribe the old topics, then subscribe
//!    the new ones, strictly in that order and all-or-nothing
//! 5. **Persist**: record the new fingerprint and mark the session
//!    subscribed
//!
//! # Example
//!
//! ```no_run
//! use cnotify_sync::{
//!     ControllerOptions, Credentials, SubscriptionController, TokenSource,
//! };
//!
//! # async fn run() -> cnotify_sync::SyncResult<()> {
//! let controller = SubscriptionController::new(
//!     Credentials::new("my-api-key"),
//!     ControllerOptions {
//!         app_version: Some("2.0".to_string()),
//!         ..Default::default()
//!     },
//!     TokenSource::Token("device-registration-token".to_string()),
//! )?;
//!
//! let outcome = controller.request_permissions_and_reconcile().await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod compare;
mod controller;
mod error;
pub mod fingerprint;
pub mod gateway;
pub mod messaging;
pub mod permission;
pub mod store;
pub mod topics;

pub use controller::{
    AbortReason, ControllerOptions, Credentials, PermissionOutcome, ReconcileOutcome,
    SubscriptionController,
};
pub use error::{SyncError, SyncResult};
pub use fingerprint::{AudienceFingerprint, FingerprintGenerator, Language};
pub use gateway::{
    AudienceGateway, GatewayConfig, HttpAudienceGateway, RemoteOutcome, DEFAULT_BASE_URL,
};
pub use messaging::{FileTokenProvider, StaticTokenProvider, TokenProvider, TokenSource};
pub use permission::{FixedPermission, Permission, PermissionProvider};
pub use store::{default_storage_dir, FingerprintStore, TopicListStore};
pub use topics::TopicGenerator;
