//! Live interview call management
//!
//! This module provides the `CallSessionController` that manages:
//! - Device preflight and credential selection before a call
//! - The start request raced against a fixed timeout
//! - Provider event handling (call start/end, volume, transcripts, errors)
//! - Failure classification and the session state machine

mod classify;
mod config;
mod controller;
mod provider;
mod state;
mod transcript;

pub use classify::{
    analyze, classify, error_message, ErrorClassification, SessionFailure, START_METHOD_ERROR,
    TIMEOUT_SENTINEL, UNKNOWN_ERROR,
};
pub use config::{CallConfig, CallDefaults, SessionSettings, START_TIMEOUT};
pub use controller::{CallSessionController, StartOutcome, UiNotice};
pub use provider::{
    CallProvider, EventSender, HandleId, ProviderError, ProviderEvent, ProviderMessage,
    ProviderSession, SessionEvent,
};
pub use state::{reduce, SessionInput, SessionState, SessionView};
pub use transcript::{TranscriptSink, Utterance};
