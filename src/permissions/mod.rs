//! Camera and microphone preflight
//!
//! A session may only start after the platform media layer has granted combined
//! audio and video access. The check acquires the devices and immediately
//! releases them.

mod gate;
mod media;

pub use gate::{PermissionGate, PermissionStatus};
pub use media::{MediaAccessError, MediaConstraints, MediaDevices, MediaStream, TrackInfo};
