//! Subscription reconciliation controller.
//!
//! Orchestrates permission acquisition, drift detection, and the
//! transactional unsubscribe/subscribe transition. One controller instance
//! owns the process-local session state; there is no global singleton.
//! Callers construct it explicitly and control re-entry through
//! [`reset_session`](SubscriptionController::reset_session).

use crate::compare;
use crate::error::{SyncError, SyncResult};
use crate::fingerprint::FingerprintGenerator;
use crate::gateway::{AudienceGateway, GatewayConfig, HttpAudienceGateway, RemoteOutcome};
use crate::messaging::{TokenProvider, TokenSource};
use crate::permission::{FixedPermission, Permission, PermissionProvider};
use crate::store::{default_storage_dir, FingerprintStore, TopicListStore};
use crate::topics::TopicGenerator;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Cap on permission-flow entries per process. This bounds logical
/// re-entry attempts; it is not time-based backoff.
const MAX_ATTEMPTS: u32 = 5;

/// Audience service credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// API key sent with every gateway call.
    pub api_key: String,
}

impl Credentials {
    /// Creates credentials from an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

/// Configuration for the subscription controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Marks this device's subscriptions as testing-only.
    pub testing_mode: bool,
    /// App version reported in the fingerprint; `None` reports `"default"`.
    pub app_version: Option<String>,
    /// Whether [`SubscriptionController::init`] runs the permission flow
    /// immediately after construction.
    pub request_permissions_automatically: bool,
    /// Locale tag override; `None` reads `LC_ALL`/`LANG`.
    pub locale: Option<String>,
    /// Storage directory override; `None` resolves to `$HOME/.cnotify`.
    pub storage_dir: Option<PathBuf>,
    /// Audience service base URL.
    pub api_base_url: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            testing_mode: false,
            app_version: None,
            request_permissions_automatically: true,
            locale: None,
            storage_dir: None,
            api_base_url: crate::gateway::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Process-local session state. `subscribed` flips true only after a fully
/// successful cycle; `attempts` counts permission-flow entries.
#[derive(Debug, Default)]
struct Session {
    subscribed: bool,
    attempts: u32,
}

/// Why a reconcile cycle was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Registration token acquisition failed.
    Token,
    /// The unsubscribe call did not succeed; subscribe was never attempted
    /// and the persisted record is unchanged.
    Unsubscribe(RemoteOutcome),
    /// The subscribe call did not succeed after a successful unsubscribe;
    /// the persisted record still holds the old fingerprint.
    Subscribe(RemoteOutcome),
    /// The new fingerprint could not be persisted; the next trigger will
    /// re-run the full transition.
    Persist,
}

/// Result of one reconcile invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The transition completed and the new fingerprint was persisted.
    Subscribed,
    /// No fingerprint drift; zero remote calls were issued.
    Unchanged,
    /// A cycle already succeeded this session; nothing was done.
    AlreadySubscribed,
    /// Another cycle is in flight; this invocation was rejected.
    InFlight,
    /// The per-process attempt budget is exhausted.
    AttemptsExhausted,
    /// The cycle aborted; the device keeps its prior persisted state.
    Aborted(AbortReason),
}

/// Result of the permission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// Permission granted; carries the reconcile outcome.
    Granted(ReconcileOutcome),
    /// Permission denied; reconciliation was not attempted.
    Denied,
}

/// The reconciliation controller.
pub struct SubscriptionController {
    options: ControllerOptions,
    generator: FingerprintGenerator,
    store: FingerprintStore,
    topic_store: TopicListStore,
    topic_generator: TopicGenerator,
    gateway: Arc<dyn AudienceGateway>,
    tokens: Arc<dyn TokenProvider>,
    permissions: Arc<dyn PermissionProvider>,
    session: Mutex<Session>,
}

impl SubscriptionController {
    /// Creates a controller against the production audience service, with
    /// an always-granting permission provider.
    pub fn new(
        credentials: Credentials,
        options: ControllerOptions,
        tokens: TokenSource,
    ) -> SyncResult<Self> {
        if credentials.api_key.trim().is_empty() {
            return Err(SyncError::Config("API key must not be empty".to_string()));
        }

        let mut gateway_config = GatewayConfig::new(credentials.api_key);
        gateway_config.base_url = options.api_base_url.clone();
        let gateway = Arc::new(HttpAudienceGateway::new(gateway_config));

        Self::with_gateway(options, gateway, tokens, Arc::new(FixedPermission::granted()))
    }

    /// Creates a controller with every collaborator injected.
    pub fn with_gateway(
        options: ControllerOptions,
        gateway: Arc<dyn AudienceGateway>,
        tokens: TokenSource,
        permissions: Arc<dyn PermissionProvider>,
    ) -> SyncResult<Self> {
        let storage_dir = match &options.storage_dir {
            Some(dir) => dir.clone(),
            None => default_storage_dir()?,
        };

        let generator = match &options.locale {
            Some(locale) => FingerprintGenerator::new(locale.clone(), options.app_version.clone()),
            None => FingerprintGenerator::from_env(options.app_version.clone()),
        };

        let tokens = tokens.into_provider()?;

        info!(
            "Initializing subscription controller (testing mode: {})",
            options.testing_mode
        );

        Ok(Self {
            options,
            generator,
            store: FingerprintStore::new(&storage_dir),
            topic_store: TopicListStore::new(&storage_dir),
            topic_generator: TopicGenerator::new(),
            gateway,
            tokens,
            permissions,
            session: Mutex::new(Session::default()),
        })
    }

    /// Constructs a controller and, when
    /// `request_permissions_automatically` is set, runs the permission flow
    /// once before returning.
    pub async fn init(
        credentials: Credentials,
        options: ControllerOptions,
        tokens: TokenSource,
    ) -> SyncResult<Self> {
        let controller = Self::new(credentials, options, tokens)?;
        if controller.options.request_permissions_automatically {
            let outcome = controller.request_permissions_and_reconcile().await;
            debug!("Automatic permission flow finished: {outcome:?}");
        }
        Ok(controller)
    }

    /// Replaces the permission provider.
    pub fn set_permission_provider(&mut self, permissions: Arc<dyn PermissionProvider>) {
        self.permissions = permissions;
    }

    /// Asks the host for notification permission and, when granted,
    /// reconciles topic subscriptions.
    ///
    /// Each granted entry consumes one attempt from the per-process budget;
    /// once the budget is exhausted the flow stops before any remote
    /// activity. Denial is terminal for the cycle but not the process: the
    /// host may invoke this again later.
    pub async fn request_permissions_and_reconcile(&self) -> PermissionOutcome {
        debug!("Checking notification permissions");
        match self.permissions.request_permission().await {
            Permission::Denied => {
                warn!("Notification permissions denied");
                return PermissionOutcome::Denied;
            }
            Permission::Granted => info!("Notification permissions granted"),
        }

        let attempt = {
            let mut session = self.session.lock().await;
            session.attempts += 1;
            session.attempts
        };

        if attempt > MAX_ATTEMPTS {
            warn!("Max subscription attempts reached, not reconciling");
            return PermissionOutcome::Granted(ReconcileOutcome::AttemptsExhausted);
        }
        info!("Attempting topic subscription (attempt {attempt}/{MAX_ATTEMPTS})");

        PermissionOutcome::Granted(self.reconcile().await)
    }

    /// Runs one reconcile cycle: generate the current fingerprint, detect
    /// drift against the persisted record, and on drift perform the
    /// unsubscribe-then-subscribe transition.
    ///
    /// The transition is strictly sequential: unsubscribe must succeed
    /// before subscribe is attempted, and nothing is persisted unless both
    /// succeed. Every failure aborts only the current cycle and is reported
    /// through the returned outcome, never as a panic or `Err`.
    pub async fn reconcile(&self) -> ReconcileOutcome {
        // The session lock doubles as the in-flight guard: it is taken
        // before the first await of the cycle body and held to the end, so
        // overlapping invocations reject instead of racing duplicate
        // remote calls.
        let mut session = match self.session.try_lock() {
            Ok(session) => session,
            Err(_) => {
                debug!("Reconcile already in flight, rejecting");
                return ReconcileOutcome::InFlight;
            }
        };

        if session.subscribed {
            debug!("Already subscribed to topics this session");
            return ReconcileOutcome::AlreadySubscribed;
        }

        info!("Starting topic reconciliation");

        let current = self.generator.generate();
        let previous = self.store.load().await;

        // An absent record always counts as drift.
        let drifted = match &previous {
            Some(previous) => !compare::fingerprints_equal(&current, previous),
            None => true,
        };

        if !drifted {
            info!("No fingerprint drift, topics already up to date");
            return ReconcileOutcome::Unchanged;
        }

        let topics = self.topic_generator.topics(&current);
        debug!("Fingerprint drift detected, target topics: {topics:?}");

        let token = match self.tokens.registration_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to acquire registration token: {e}");
                return ReconcileOutcome::Aborted(AbortReason::Token);
            }
        };

        // Old state must be removed before the new state is established.
        let outcome = self.gateway.unsubscribe(&token).await;
        if !outcome.is_success() {
            warn!("Failed to unsubscribe from previous topics, aborting cycle");
            return ReconcileOutcome::Aborted(AbortReason::Unsubscribe(outcome));
        }

        let outcome = self
            .gateway
            .subscribe(&current, &token, self.options.testing_mode)
            .await;
        if !outcome.is_success() {
            warn!("Failed to subscribe to new topics, aborting cycle");
            return ReconcileOutcome::Aborted(AbortReason::Subscribe(outcome));
        }

        if let Err(e) = self.store.save(&current).await {
            warn!("Failed to persist fingerprint, will re-run on next trigger: {e}");
            return ReconcileOutcome::Aborted(AbortReason::Persist);
        }

        // Legacy record, best-effort.
        if let Err(e) = self.topic_store.save(&topics).await {
            warn!("Failed to persist legacy topic list: {e}");
        }

        session.subscribed = true;
        info!("Topic reconciliation finished");
        ReconcileOutcome::Subscribed
    }

    /// Clears the subscribed flag and the attempt counter, re-arming the
    /// controller for another full cycle.
    pub async fn reset_session(&self) {
        let mut session = self.session.lock().await;
        session.subscribed = false;
        session.attempts = 0;
        debug!("Session state reset");
    }

    /// Whether a cycle has fully succeeded this session.
    pub async fn is_subscribed(&self) -> bool {
        self.session.lock().await.subscribed
    }
}
