use super::classify::SessionFailure;
use crate::permissions::PermissionStatus;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    CheckingPermissions,
    Connecting,
    Active,
    Ending,
}

impl SessionState {
    /// A provider handle exists or is being brought up
    pub fn is_in_flight(self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Active)
    }
}

/// Everything that can move the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInput {
    StartRequested,
    PermissionsGranted,
    PermissionsDenied,
    /// No credential, start rejected or timed out, or a fatal provider error
    Failed,
    ProviderCallStart,
    ProviderCallEnd,
    StopRequested,
    /// Teardown after Ending finished
    Ended,
}

/// Pure transition function; inputs that are not legal in `state` leave it unchanged
pub fn reduce(state: SessionState, input: SessionInput) -> SessionState {
    use SessionInput as I;
    use SessionState as S;

    match (state, input) {
        (S::Idle, I::StartRequested) => S::CheckingPermissions,
        (S::CheckingPermissions, I::PermissionsGranted) => S::Connecting,
        (S::CheckingPermissions, I::PermissionsDenied) => S::Idle,
        (S::CheckingPermissions | S::Connecting | S::Active, I::Failed) => S::Idle,
        (S::Connecting, I::ProviderCallStart) => S::Active,
        (S::Connecting | S::Active, I::StopRequested | I::ProviderCallEnd) => S::Ending,
        (S::Ending, I::Ended) => S::Idle,
        (unchanged, _) => unchanged,
    }
}

/// Observable snapshot of the controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    pub mic_enabled: bool,
    pub volume_level: f32,
    /// Busy indicator while a start attempt is in progress
    pub starting: bool,
    pub credential_prompt_visible: bool,
    pub permission_status: PermissionStatus,
    pub last_failure: Option<SessionFailure>,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            mic_enabled: false,
            volume_level: 0.0,
            starting: false,
            credential_prompt_visible: false,
            permission_status: PermissionStatus::Unknown,
            last_failure: None,
        }
    }
}
