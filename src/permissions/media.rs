use serde::Serialize;
use std::fmt;

/// Which devices to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl MediaConstraints {
    pub const AUDIO_VIDEO: Self = Self {
        audio: true,
        video: true,
    };
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackInfo {
    /// "audio" or "video"
    pub kind: String,
    pub label: String,
    pub ready_state: String,
}

/// Failure reported by the platform media layer
#[derive(Debug, Clone)]
pub struct MediaAccessError {
    /// Platform error name, e.g. `NotFoundError`, `NotAllowedError`
    pub kind: String,
    pub message: String,
}

impl MediaAccessError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for MediaAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for MediaAccessError {}

/// Acquired device streams; must be released by the holder
pub trait MediaStream: Send {
    fn id(&self) -> &str;

    fn tracks(&self) -> Vec<TrackInfo>;

    /// Stop every track and give the devices back
    fn release(self: Box<Self>);
}

/// Platform media device access
#[async_trait::async_trait]
pub trait MediaDevices: Send + Sync {
    async fn request_access(
        &self,
        constraints: MediaConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaAccessError>;
}
