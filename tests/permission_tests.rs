mod common;

use common::FakeMedia;
use prepwise_interview::{DebugLog, DeniedReason, PermissionGate, PermissionStatus};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn gate(media: &Arc<FakeMedia>) -> (PermissionGate, Arc<DebugLog>) {
    let log = Arc::new(DebugLog::new(50));
    let gate = PermissionGate::new(media.clone()).with_debug_log(Arc::clone(&log));
    (gate, log)
}

#[tokio::test]
async fn test_grant_releases_devices() {
    let media = FakeMedia::granting();
    let (gate, log) = gate(&media);
    assert_eq!(gate.status(), PermissionStatus::Unknown);

    gate.check().await.unwrap();

    assert_eq!(gate.status(), PermissionStatus::Granted);
    assert_eq!(media.requests.load(Ordering::SeqCst), 1);
    assert_eq!(media.releases.load(Ordering::SeqCst), 1);

    let lines = log.lines();
    assert!(lines.iter().any(|l| l.contains("Stream ID: stream-1")));
    assert!(lines.iter().any(|l| l.contains("Track: audio - Built-in Microphone (live)")));
    assert!(lines.iter().any(|l| l.contains("Track: video - FaceTime HD Camera (live)")));
}

#[tokio::test]
async fn test_missing_device() {
    let media = FakeMedia::failing("NotFoundError", "Requested device not found");
    let (gate, _) = gate(&media);

    let reason = gate.check().await.unwrap_err();

    assert_eq!(reason, DeniedReason::DeviceNotFound);
    assert_eq!(
        reason.to_string(),
        "No camera or microphone found. Please ensure your devices are connected."
    );
    assert_eq!(gate.status(), PermissionStatus::Denied);
}

#[tokio::test]
async fn test_device_not_found_by_message() {
    let media = FakeMedia::failing("OverconstrainedError", "device not found");
    let (gate, _) = gate(&media);

    assert_eq!(gate.check().await, Err(DeniedReason::DeviceNotFound));
}

#[tokio::test]
async fn test_user_refused() {
    for kind in ["NotAllowedError", "PermissionDeniedError"] {
        let media = FakeMedia::failing(kind, "Permission denied");
        let (gate, _) = gate(&media);

        assert_eq!(gate.check().await, Err(DeniedReason::PermissionDenied), "{}", kind);
        assert_eq!(media.releases.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_other_failure_keeps_message() {
    let media = FakeMedia::failing("NotReadableError", "Could not start video source");
    let (gate, _) = gate(&media);

    let reason = gate.check().await.unwrap_err();

    assert_eq!(
        reason.to_string(),
        "Error accessing media devices: Could not start video source"
    );
}

#[tokio::test]
async fn test_status_follows_latest_check() {
    let media = FakeMedia::failing("NotAllowedError", "Permission denied");
    let (gate, _) = gate(&media);
    let mut rx = gate.subscribe();

    assert!(gate.check().await.is_err());
    assert_eq!(*rx.borrow_and_update(), PermissionStatus::Denied);

    media.grant();
    gate.check().await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), PermissionStatus::Granted);
}
