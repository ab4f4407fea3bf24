//! Process-wide cross-window message channel.
//!
//! Popups (or the loopback callback) post messages here; every in-flight
//! authorization attempt holds exactly one [`Listener`]. Dropping the
//! listener deregisters it.

use crate::constants::AUTH_MESSAGE_TYPE;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

/// A message delivered from another window, tagged with the sender origin.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossWindowMessage {
    pub origin: String,
    pub data: Value,
}

/// Payload of an authorization-code message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthCodePayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub code: String,
    /// Echo of the OAuth `state` parameter, when the relay forwards it.
    #[serde(default)]
    pub state: Option<String>,
}

impl CrossWindowMessage {
    pub fn new(origin: &str, data: Value) -> Self {
        Self {
            origin: origin.to_string(),
            data,
        }
    }

    /// Builds an authorization-code message as the callback page sends it.
    pub fn auth_code(origin: &str, code: &str, state: Option<&str>) -> Self {
        let mut data = json!({ "type": AUTH_MESSAGE_TYPE, "code": code });
        if let Some(state) = state {
            data["state"] = Value::String(state.to_string());
        }
        Self::new(origin, data)
    }

    /// The authorization payload, if this message is one and carries a code.
    pub fn auth_payload(&self) -> Option<AuthCodePayload> {
        let payload: AuthCodePayload = serde_json::from_value(self.data.clone()).ok()?;
        (payload.kind == AUTH_MESSAGE_TYPE && !payload.code.is_empty()).then_some(payload)
    }
}

#[derive(Clone)]
pub struct MessageBus {
    sender: broadcast::Sender<CrossWindowMessage>,
}

impl MessageBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Delivers a message to every registered listener and returns how many
    /// received it.
    pub fn post(&self, message: CrossWindowMessage) -> usize {
        match self.sender.send(message) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!("Cross-window message dropped, no listeners registered");
                0
            }
        }
    }

    /// Registers a listener owned by the given attempt.
    pub fn subscribe(&self, owner: Uuid) -> Listener {
        tracing::debug!(attempt = %owner, "Message listener registered");
        Listener {
            owner,
            receiver: self.sender.subscribe(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A registered message listener. Released on drop.
pub struct Listener {
    owner: Uuid,
    receiver: broadcast::Receiver<CrossWindowMessage>,
}

impl Listener {
    /// Next message, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<CrossWindowMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(attempt = %self.owner, "Listener lagged, {} messages skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        tracing::debug!(attempt = %self.owner, "Message listener released");
    }
}
