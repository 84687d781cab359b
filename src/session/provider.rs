use super::config::CallConfig;
use crate::credentials::Credential;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity of one provider session handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HandleId(Uuid);

impl HandleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload of the provider's `message` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMessage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub transcript_type: Option<String>,
    pub role: Option<String>,
    pub transcript: Option<String>,
}

impl ProviderMessage {
    pub fn transcript(transcript_type: &str, role: &str, text: &str) -> Self {
        Self {
            kind: Some("transcript".to_string()),
            transcript_type: Some(transcript_type.to_string()),
            role: Some(role.to_string()),
            transcript: Some(text.to_string()),
        }
    }
}

/// The five provider event hooks
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    CallStart,
    CallEnd,
    /// Remote speaker volume, nominally 0..1
    VolumeLevel(f32),
    Message(ProviderMessage),
    Error(Value),
}

impl ProviderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderEvent::CallStart => "call-start",
            ProviderEvent::CallEnd => "call-end",
            ProviderEvent::VolumeLevel(_) => "volume-level",
            ProviderEvent::Message(_) => "message",
            ProviderEvent::Error(_) => "error",
        }
    }
}

/// A provider event tagged with the handle that emitted it
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub handle: HandleId,
    pub event: ProviderEvent,
}

/// Hook binding handed to a provider session at creation
#[derive(Debug, Clone)]
pub struct EventSender {
    handle: HandleId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSender {
    pub(crate) fn new(handle: HandleId, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { handle, tx }
    }

    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Deliver an event; returns false once the controller is gone
    pub fn send(&self, event: ProviderEvent) -> bool {
        self.tx
            .send(SessionEvent {
                handle: self.handle,
                event,
            })
            .is_ok()
    }
}

/// Opaque failure payload from the provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError(pub Value);

impl ProviderError {
    pub fn message(message: impl Into<String>) -> Self {
        Self(json!({ "message": message.into() }))
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for ProviderError {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", super::classify::error_message(&self.0))
    }
}

impl std::error::Error for ProviderError {}

/// One live call with the voice provider
#[async_trait::async_trait]
pub trait ProviderSession: Send {
    /// Issue the start request.
    ///
    /// Implementations send [`CallConfig::to_provider_payload`] as the
    /// assistant definition. The returned future owns everything it needs so it can outlive the
    /// controller's interest in it.
    fn start(&mut self, config: CallConfig) -> BoxFuture<'static, Result<(), ProviderError>>;

    async fn stop(&mut self) -> Result<(), ProviderError>;

    fn set_muted(&mut self, muted: bool);
}

/// Creates provider session handles
pub trait CallProvider: Send + Sync {
    /// Build a new handle bound to `events`. No network traffic happens until
    /// `start` is called.
    fn connect(
        &self,
        credential: &Credential,
        events: EventSender,
    ) -> Result<Box<dyn ProviderSession>, ProviderError>;
}
