//! Remote audience service gateway.
//!
//! Performs the subscribe/unsubscribe calls against the audience service
//! and classifies their outcomes. The gateway is fire-and-observe: it
//! issues exactly one network call per invocation, never retries, and does
//! not interpret the response body. Retry policy, if any, belongs to the
//! caller.

use crate::fingerprint::AudienceFingerprint;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Production audience-service endpoint.
pub const DEFAULT_BASE_URL: &str =
    "https://audience-service-dot-eruka-notify-me.uc.r.appspot.com/v1/subscription";

/// Outcome of a single gateway call. No payload beyond the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// HTTP 200.
    Success,
    /// Any non-200/429 status, or a transport failure.
    Error,
    /// HTTP 429, the service is throttling this device.
    TooManyRequests,
}

impl RemoteOutcome {
    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the audience service (overridable for tests).
    pub base_url: String,
    /// API key sent in the `x-api-key` header.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// Creates a config for the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout_secs: 30,
        }
    }
}

/// Abstract audience service interface.
#[async_trait]
pub trait AudienceGateway: Send + Sync {
    /// Subscribes this device to the topics for `fingerprint`.
    async fn subscribe(
        &self,
        fingerprint: &AudienceFingerprint,
        registration_token: &str,
        testing_mode: bool,
    ) -> RemoteOutcome;

    /// Unsubscribes this device from its current topics.
    async fn unsubscribe(&self, registration_token: &str) -> RemoteOutcome;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeBody<'a> {
    firebase_registration_token: &'a str,
    testing_mode: bool,
    internal_metadata: &'a AudienceFingerprint,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnsubscribeBody<'a> {
    firebase_registration_token: &'a str,
}

/// HTTP implementation of the audience gateway.
pub struct HttpAudienceGateway {
    config: GatewayConfig,
    client: Client,
}

impl HttpAudienceGateway {
    /// Creates a gateway with a shared HTTP client.
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    /// Issues one POST and classifies the response status. Transport
    /// failures are absorbed here and never propagate past the gateway.
    async fn post<T: Serialize>(&self, uri: &str, body: &T) -> RemoteOutcome {
        let url = format!("{}{}", self.config.base_url, uri);
        debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await;

        match response {
            Ok(response) => match response.status().as_u16() {
                200 => RemoteOutcome::Success,
                429 => {
                    warn!("Audience service throttled request to {uri}");
                    RemoteOutcome::TooManyRequests
                }
                status => {
                    warn!("Audience service returned {status} for {uri}");
                    RemoteOutcome::Error
                }
            },
            Err(e) => {
                warn!("Audience service request to {uri} failed: {e}");
                RemoteOutcome::Error
            }
        }
    }
}

#[async_trait]
impl AudienceGateway for HttpAudienceGateway {
    async fn subscribe(
        &self,
        fingerprint: &AudienceFingerprint,
        registration_token: &str,
        testing_mode: bool,
    ) -> RemoteOutcome {
        let body = SubscribeBody {
            firebase_registration_token: registration_token,
            testing_mode,
            internal_metadata: fingerprint,
        };
        self.post("/subscribe", &body).await
    }

    async fn unsubscribe(&self, registration_token: &str) -> RemoteOutcome {
        let body = UnsubscribeBody {
            firebase_registration_token: registration_token,
        };
        self.post("/unsubscribe", &body).await
    }
}

/// A scripted gateway for testing.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// A call observed by the mock, in invocation order.
    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedCall {
        /// A subscribe call with its full arguments.
        Subscribe {
            fingerprint: AudienceFingerprint,
            registration_token: String,
            testing_mode: bool,
        },
        /// An unsubscribe call.
        Unsubscribe { registration_token: String },
    }

    /// A gateway whose outcomes are scripted and whose calls are recorded.
    pub struct MockGateway {
        subscribe_outcome: Mutex<RemoteOutcome>,
        unsubscribe_outcome: Mutex<RemoteOutcome>,
        call_delay: Mutex<Option<Duration>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockGateway {
        /// Creates a mock where both directions succeed.
        pub fn new() -> Self {
            Self::with_outcomes(RemoteOutcome::Success, RemoteOutcome::Success)
        }

        /// Creates a mock with scripted outcomes per direction.
        pub fn with_outcomes(unsubscribe: RemoteOutcome, subscribe: RemoteOutcome) -> Self {
            Self {
                subscribe_outcome: Mutex::new(subscribe),
                unsubscribe_outcome: Mutex::new(unsubscribe),
                call_delay: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Delays every call, to widen the window for overlap tests.
        pub fn set_call_delay(&self, delay: Duration) {
            *self.call_delay.lock().unwrap() = Some(delay);
        }

        /// The calls observed so far, in order.
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        async fn maybe_delay(&self) {
            let delay = *self.call_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    impl Default for MockGateway {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl AudienceGateway for MockGateway {
        async fn subscribe(
            &self,
            fingerprint: &AudienceFingerprint,
            registration_token: &str,
            testing_mode: bool,
        ) -> RemoteOutcome {
            self.maybe_delay().await;
            self.calls.lock().unwrap().push(RecordedCall::Subscribe {
                fingerprint: fingerprint.clone(),
                registration_token: registration_token.to_string(),
                testing_mode,
            });
            *self.subscribe_outcome.lock().unwrap()
        }

        async fn unsubscribe(&self, registration_token: &str) -> RemoteOutcome {
            self.maybe_delay().await;
            self.calls.lock().unwrap().push(RecordedCall::Unsubscribe {
                registration_token: registration_token.to_string(),
            });
            *self.unsubscribe_outcome.lock().unwrap()
        }
    }
}
