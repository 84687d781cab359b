use thiserror::Error;

/// Why a device permission preflight failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeniedReason {
    #[error("No camera or microphone found. Please ensure your devices are connected.")]
    DeviceNotFound,

    #[error("Please allow Microphone and Camera access in your browser settings.")]
    PermissionDenied,

    #[error("Error accessing media devices: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("no call provider credential is configured")]
    Unavailable,

    #[error("refusing to persist an empty credential")]
    Empty,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Failure of the one-shot question generation request
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("invalid interview request: {0}")]
    InvalidRequest(String),

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Failed to generate valid JSON format")]
    Malformed { raw: String },

    #[error("question service error: {0}")]
    Remote(String),

    #[error("failed to reach question service: {0}")]
    Transport(String),
}

impl GenerationError {
    /// Raw model output attached to a malformed response, if any
    pub fn raw(&self) -> Option<&str> {
        match self {
            GenerationError::Malformed { raw } => Some(raw),
            _ => None,
        }
    }
}
