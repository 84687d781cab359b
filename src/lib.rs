pub mod config;
pub mod credentials;
pub mod debug_log;
pub mod error;
pub mod http;
pub mod permissions;
pub mod questions;
pub mod session;

pub use config::Config;
pub use credentials::{
    Credential, CredentialResolver, CredentialSource, CredentialStore, FileCredentialStore,
    MemoryCredentialStore,
};
pub use debug_log::{DebugLog, DebugLogEntry};
pub use error::{CredentialError, DeniedReason, GenerationError};
pub use http::{create_router, AppState};
pub use permissions::{MediaAccessError, MediaDevices, MediaStream, PermissionGate, PermissionStatus};
pub use questions::{
    GeminiClient, InterviewQuestion, InterviewRequest, QuestionGenerator, QuestionSet,
    QuestionSetClient, QuestionSetProvider,
};
pub use session::{
    classify, CallConfig, CallDefaults, CallProvider, CallSessionController, ErrorClassification,
    EventSender, HandleId, ProviderError, ProviderEvent, ProviderMessage, ProviderSession,
    SessionEvent, SessionFailure, SessionSettings, SessionState, SessionView, StartOutcome,
    TranscriptSink, UiNotice,
};
