//! Popup-window authorization handshake.
//!
//! An [`AuthCoordinator`] turns a profile id into an [`AuthAttempt`]: it
//! fetches the provider's authorization URL from the backend, opens it in a
//! popup and registers one message listener for the attempt. Running the
//! attempt waits for the authorization-code message, exchanges the code
//! exactly once and releases everything it holds.
//!
//! ```text
//! Idle -> PopupOpened -> CodeReceived -> TokenExchanged -> Idle
//!              |
//!              +-> Idle (popup closed, timed out, superseded, shut down)
//! ```

pub mod bus;
pub mod callback;
pub mod popup;

use crate::api::{ApiError, Backend, TokenRequest};
use crate::config::AppConfig;
use crate::constants::AUTH_POPUP_NAME;
use bus::{CrossWindowMessage, Listener, MessageBus};
use popup::{PopupError, PopupFeatures, PopupHandle, PopupHost};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use url::Url;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("failed to fetch authorization link: {0}")]
    Link(#[source] ApiError),
    #[error("authorization link is not a valid URL: {0}")]
    InvalidLink(String),
    #[error("failed to open authorization popup: {0}")]
    Popup(#[from] PopupError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    PopupOpened,
    CodeReceived,
    TokenExchanged { success: bool },
}

/// How an attempt ended.
#[derive(Debug)]
pub enum AuthOutcome {
    /// The backend stored the token.
    Authorized,
    /// The backend refused the code.
    Rejected { detail: Option<String> },
    /// The exchange request itself failed.
    ExchangeFailed(ApiError),
    /// The user closed the popup without finishing.
    Abandoned,
    TimedOut,
    /// Superseded by a newer attempt for the same profile, or shut down.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Exact origins (`scheme://host[:port]`) allowed to deliver codes.
    pub trusted_origins: Vec<String>,
    pub popup: PopupFeatures,
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
}

impl AuthSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            trusted_origins: config.trusted_origins(),
            popup: PopupFeatures {
                width: config.popup_width,
                height: config.popup_height,
            },
            poll_interval: config.popup_poll_interval(),
            timeout: config.auth_timeout(),
        }
    }

    fn is_trusted(&self, origin: &str) -> bool {
        self.trusted_origins.iter().any(|o| o == origin)
    }
}

struct Registration {
    attempt_id: Uuid,
    cancel: oneshot::Sender<()>,
}

type Registry = Arc<Mutex<HashMap<i64, Registration>>>;

fn lock_registry(registry: &Registry) -> MutexGuard<'_, HashMap<i64, Registration>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct AuthCoordinator {
    backend: Arc<dyn Backend>,
    popups: Arc<dyn PopupHost>,
    bus: MessageBus,
    settings: Arc<AuthSettings>,
    registry: Registry,
}

impl AuthCoordinator {
    pub fn new(
        backend: Arc<dyn Backend>,
        popups: Arc<dyn PopupHost>,
        bus: MessageBus,
        settings: AuthSettings,
    ) -> Self {
        Self {
            backend,
            popups,
            bus,
            settings: Arc::new(settings),
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Starts authorizing `profile_id`.
    ///
    /// On success the popup is open and one listener is registered; the
    /// returned attempt must be run to complete the flow. An in-flight
    /// attempt for the same profile is cancelled.
    pub async fn initiate(&self, profile_id: i64) -> Result<AuthAttempt, AuthError> {
        let link = self
            .backend
            .auth_link(profile_id)
            .await
            .map_err(AuthError::Link)?;

        let attempt_id = Uuid::new_v4();
        let url = with_state(&link.url, attempt_id)?;
        let popup = self
            .popups
            .open(&url, AUTH_POPUP_NAME, self.settings.popup)?;
        let listener = self.bus.subscribe(attempt_id);

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let previous = lock_registry(&self.registry).insert(
            profile_id,
            Registration {
                attempt_id,
                cancel: cancel_tx,
            },
        );
        if let Some(previous) = previous {
            tracing::info!(
                profile_id,
                superseded = %previous.attempt_id,
                "Cancelling earlier authorization attempt"
            );
            let _ = previous.cancel.send(());
        }

        tracing::info!(profile_id, attempt = %attempt_id, "Authorization popup opened");
        Ok(AuthAttempt {
            id: attempt_id,
            profile_id,
            state: AttemptState::PopupOpened,
            popup,
            listener: Some(listener),
            cancel: cancel_rx,
            backend: Arc::clone(&self.backend),
            settings: Arc::clone(&self.settings),
            registry: Arc::clone(&self.registry),
        })
    }

    /// Whether an attempt for `profile_id` is waiting for its code.
    pub fn is_pending(&self, profile_id: i64) -> bool {
        lock_registry(&self.registry).contains_key(&profile_id)
    }

    pub fn pending_count(&self) -> usize {
        lock_registry(&self.registry).len()
    }

    /// Cancels every in-flight attempt, e.g. when the page goes away.
    pub fn shutdown(&self) {
        let drained: Vec<Registration> = lock_registry(&self.registry)
            .drain()
            .map(|(_, registration)| registration)
            .collect();
        for registration in drained {
            let _ = registration.cancel.send(());
        }
    }
}

/// Appends (or replaces) the OAuth `state` parameter.
fn with_state(link: &str, attempt_id: Uuid) -> Result<String, AuthError> {
    let mut url = Url::parse(link).map_err(|e| AuthError::InvalidLink(e.to_string()))?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "state")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("state", &attempt_id.to_string());
    Ok(url.into())
}

enum Wake {
    Cancelled,
    Message(Option<CrossWindowMessage>),
    Tick,
    TimedOut,
}

async fn next_message(listener: &mut Option<Listener>) -> Option<CrossWindowMessage> {
    match listener {
        Some(listener) => listener.recv().await,
        None => std::future::pending().await,
    }
}

/// One in-flight authorization. Dropping it releases the listener and the
/// pending flag.
pub struct AuthAttempt {
    id: Uuid,
    profile_id: i64,
    state: AttemptState,
    popup: Box<dyn PopupHandle>,
    listener: Option<Listener>,
    cancel: oneshot::Receiver<()>,
    backend: Arc<dyn Backend>,
    settings: Arc<AuthSettings>,
    registry: Registry,
}

impl AuthAttempt {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile_id(&self) -> i64 {
        self.profile_id
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Waits for the authorization code and exchanges it.
    pub async fn run(mut self) -> AuthOutcome {
        let mut poll = tokio::time::interval(self.settings.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = self.settings.timeout.map(|t| Instant::now() + t);
        let timeout = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(timeout);

        let code = loop {
            let wake = tokio::select! {
                biased;
                _ = &mut self.cancel => Wake::Cancelled,
                message = next_message(&mut self.listener) => Wake::Message(message),
                _ = poll.tick() => Wake::Tick,
                _ = &mut timeout => Wake::TimedOut,
            };
            match wake {
                Wake::Cancelled => return self.finish(AuthOutcome::Cancelled),
                Wake::Message(None) => {
                    tracing::warn!(attempt = %self.id, "Message bus closed");
                    return self.finish(AuthOutcome::Cancelled);
                }
                Wake::Message(Some(message)) => {
                    if let Some(code) = self.accept(&message) {
                        break code;
                    }
                }
                Wake::Tick => {
                    if self.popup.is_closed() {
                        tracing::info!(attempt = %self.id, "Authorization popup closed by user");
                        return self.finish(AuthOutcome::Abandoned);
                    }
                }
                Wake::TimedOut => {
                    tracing::warn!(attempt = %self.id, "Authorization timed out");
                    self.popup.close();
                    return self.finish(AuthOutcome::TimedOut);
                }
            }
        };

        self.state = AttemptState::CodeReceived;
        self.listener = None;
        self.popup.close();

        let request = TokenRequest {
            profile_id: self.profile_id,
            auth_code: code,
        };
        let outcome = match self.backend.exchange_token(&request).await {
            Ok(()) => AuthOutcome::Authorized,
            Err(e) if e.is_status() => AuthOutcome::Rejected {
                detail: e.detail().map(str::to_string),
            },
            Err(e) => {
                tracing::error!(attempt = %self.id, "Token exchange failed: {}", e);
                AuthOutcome::ExchangeFailed(e)
            }
        };
        self.state = AttemptState::TokenExchanged {
            success: matches!(outcome, AuthOutcome::Authorized),
        };
        self.finish(outcome)
    }

    /// The authorization code, if `message` is meant for this attempt.
    fn accept(&self, message: &CrossWindowMessage) -> Option<String> {
        if !self.settings.is_trusted(&message.origin) {
            tracing::warn!(
                attempt = %self.id,
                origin = %message.origin,
                "Ignoring message from untrusted origin"
            );
            return None;
        }
        let payload = message.auth_payload()?;
        match payload.state.as_deref() {
            Some(state) if state == self.id.to_string() => Some(payload.code),
            Some(_) => {
                tracing::debug!(attempt = %self.id, "Message belongs to another attempt");
                None
            }
            None => {
                // Without a state echo the code can only be attributed when
                // this is the sole pending attempt.
                let registry = lock_registry(&self.registry);
                let sole = registry.len() == 1
                    && registry
                        .get(&self.profile_id)
                        .is_some_and(|r| r.attempt_id == self.id);
                if sole {
                    Some(payload.code)
                } else {
                    tracing::warn!(attempt = %self.id, "Ambiguous authorization code ignored");
                    None
                }
            }
        }
    }

    fn finish(mut self, outcome: AuthOutcome) -> AuthOutcome {
        tracing::info!(
            profile_id = self.profile_id,
            attempt = %self.id,
            "Authorization attempt finished: {:?}",
            outcome
        );
        self.release();
        outcome
    }

    fn release(&mut self) {
        self.listener = None;
        let mut registry = lock_registry(&self.registry);
        if registry
            .get(&self.profile_id)
            .is_some_and(|r| r.attempt_id == self.id)
        {
            registry.remove(&self.profile_id);
        }
        self.state = AttemptState::Idle;
    }
}

impl Drop for AuthAttempt {
    fn drop(&mut self) {
        if self.state != AttemptState::Idle {
            self.release();
        }
    }
}
