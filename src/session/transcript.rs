use super::provider::ProviderMessage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

/// The candidate's most recent finished sentence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub text: String,
    pub received_at: DateTime<Utc>,
}

/// Holds only the latest finalized user utterance; earlier ones are overwritten
pub struct TranscriptSink {
    latest: watch::Sender<Option<Utterance>>,
}

impl TranscriptSink {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self { latest }
    }

    /// Take the message if it is a finalized user transcript.
    ///
    /// Returns whether the sink changed.
    pub fn offer(&self, message: &ProviderMessage) -> bool {
        let is_final_user_transcript = message.kind.as_deref() == Some("transcript")
            && message.transcript_type.as_deref() == Some("final")
            && message.role.as_deref() == Some("user");

        if !is_final_user_transcript {
            return false;
        }

        let Some(text) = message.transcript.clone() else {
            return false;
        };

        debug!("Final user transcript: {}", text);
        self.latest.send_replace(Some(Utterance {
            text,
            received_at: Utc::now(),
        }));
        true
    }

    pub fn latest(&self) -> Option<Utterance> {
        self.latest.borrow().clone()
    }

    pub fn latest_text(&self) -> Option<String> {
        self.latest.borrow().as_ref().map(|u| u.text.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Utterance>> {
        self.latest.subscribe()
    }
}

impl Default for TranscriptSink {
    fn default() -> Self {
        Self::new()
    }
}
