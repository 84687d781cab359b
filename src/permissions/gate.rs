use super::media::{MediaAccessError, MediaConstraints, MediaDevices};
use crate::debug_log::DebugLog;
use crate::error::DeniedReason;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Last observed device permission, for display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    #[default]
    Unknown,
    Granted,
    Denied,
}

pub struct PermissionGate {
    devices: Arc<dyn MediaDevices>,
    status: watch::Sender<PermissionStatus>,
    log: Arc<DebugLog>,
}

impl PermissionGate {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        let (status, _) = watch::channel(PermissionStatus::Unknown);
        Self {
            devices,
            status,
            log: DebugLog::global(),
        }
    }

    pub fn with_debug_log(mut self, log: Arc<DebugLog>) -> Self {
        self.log = log;
        self
    }

    pub fn status(&self) -> PermissionStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PermissionStatus> {
        self.status.subscribe()
    }

    /// Request audio+video access and release it straight away
    pub async fn check(&self) -> Result<(), DeniedReason> {
        self.log.record("Checking permissions...");

        match self.devices.request_access(MediaConstraints::AUDIO_VIDEO).await {
            Ok(stream) => {
                self.log
                    .record(format!("Permissions granted. Stream ID: {}", stream.id()));
                for track in stream.tracks() {
                    self.log.record(format!(
                        "Track: {} - {} ({})",
                        track.kind, track.label, track.ready_state
                    ));
                }
                stream.release();

                info!("Media permissions granted");
                self.status.send_replace(PermissionStatus::Granted);
                Ok(())
            }
            Err(e) => {
                self.log.record_with(
                    "Permission denied or error:",
                    serde_json::Value::String(e.message.clone()),
                );
                self.status.send_replace(PermissionStatus::Denied);

                let reason = classify_denial(&e);
                warn!("Media permissions denied: {} ({:?})", e, reason);
                Err(reason)
            }
        }
    }
}

fn classify_denial(error: &MediaAccessError) -> DeniedReason {
    match error.kind.as_str() {
        "NotFoundError" => DeniedReason::DeviceNotFound,
        _ if error.message.contains("device not found") => DeniedReason::DeviceNotFound,
        "NotAllowedError" | "PermissionDeniedError" => DeniedReason::PermissionDenied,
        _ => DeniedReason::Other(error.message.clone()),
    }
}
