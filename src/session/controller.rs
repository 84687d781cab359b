use super::classify::{self, ErrorClassification, SessionFailure, TIMEOUT_SENTINEL};
use super::config::{CallConfig, SessionSettings, START_TIMEOUT};
use super::provider::{
    CallProvider, EventSender, HandleId, ProviderError, ProviderEvent, ProviderSession,
    SessionEvent,
};
use super::state::{reduce, SessionInput, SessionState, SessionView};
use super::transcript::TranscriptSink;
use crate::credentials::CredentialResolver;
use crate::debug_log::DebugLog;
use crate::error::{CredentialError, DeniedReason};
use crate::permissions::PermissionGate;
use crate::questions::QuestionSet;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// How long a detached start request may linger before it is dropped
const STALE_START_GRACE: Duration = Duration::from_secs(30);

/// Something the UI must act on
#[derive(Debug, Clone, PartialEq)]
pub enum UiNotice {
    /// Show this message to the user
    Alert(String),
    /// The provider ended the call; the interview can be reviewed
    ResultsReady,
}

/// Result of a start request
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// Provider accepted the start; Active follows on call-start
    Connecting,
    /// Call-start arrived before the start request settled
    Active,
    /// The user hung up before the call became active
    Stopped,
    /// The provider ended the call before it became active
    Ended,
    /// A session was already in flight; nothing happened
    AlreadyInFlight,
    NoQuestions,
    PermissionDenied(DeniedReason),
    NoCredential,
    Failed(ErrorClassification),
}

#[derive(Debug)]
enum ControlCommand {
    Stop,
}

/// Asks the controller to hang up from outside, including while a start is pending
#[derive(Debug, Clone)]
pub struct SessionStopper {
    tx: mpsc::UnboundedSender<ControlCommand>,
}

impl SessionStopper {
    /// Returns false once the controller is gone
    pub fn stop(&self) -> bool {
        self.tx.send(ControlCommand::Stop).is_ok()
    }
}

/// The provider handle the controller currently owns
struct LiveSession {
    id: HandleId,
    handle: Box<dyn ProviderSession>,
}

/// Owns the single interview call and drives its state machine
pub struct CallSessionController {
    settings: SessionSettings,
    provider: Arc<dyn CallProvider>,
    permissions: PermissionGate,
    credentials: CredentialResolver,
    transcript: TranscriptSink,
    log: Arc<DebugLog>,

    /// Current handle; replaced, never mutated in place, on each start
    session: Option<LiveSession>,

    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,

    commands_tx: mpsc::UnboundedSender<ControlCommand>,
    commands_rx: mpsc::UnboundedReceiver<ControlCommand>,

    view: watch::Sender<SessionView>,
    notices_tx: mpsc::UnboundedSender<UiNotice>,
    notices_rx: Option<mpsc::UnboundedReceiver<UiNotice>>,
}

impl CallSessionController {
    pub fn new(
        settings: SessionSettings,
        provider: Arc<dyn CallProvider>,
        permissions: PermissionGate,
        credentials: CredentialResolver,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (view, _) = watch::channel(SessionView {
            permission_status: permissions.status(),
            ..SessionView::default()
        });

        Self {
            settings,
            provider,
            permissions,
            credentials,
            transcript: TranscriptSink::new(),
            log: DebugLog::global(),
            session: None,
            events_tx,
            events_rx,
            commands_tx,
            commands_rx,
            view,
            notices_tx,
            notices_rx: Some(notices_rx),
        }
    }

    pub fn with_debug_log(mut self, log: Arc<DebugLog>) -> Self {
        self.log = log;
        self
    }

    pub fn state(&self) -> SessionState {
        self.view.borrow().state
    }

    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.subscribe()
    }

    /// Handle for hanging up while the controller is busy starting a call
    pub fn stopper(&self) -> SessionStopper {
        SessionStopper {
            tx: self.commands_tx.clone(),
        }
    }

    /// Alerts and review signals for the UI; can be taken once
    pub fn take_notices(&mut self) -> Option<mpsc::UnboundedReceiver<UiNotice>> {
        self.notices_rx.take()
    }

    pub fn transcript(&self) -> &TranscriptSink {
        &self.transcript
    }

    pub fn permissions(&self) -> &PermissionGate {
        &self.permissions
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    pub fn debug_log(&self) -> &Arc<DebugLog> {
        &self.log
    }

    /// Id of the handle whose events are currently accepted
    pub fn current_handle(&self) -> Option<HandleId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Begin an interview call.
    ///
    /// Returns once the provider has accepted the start request, the call is
    /// up, or the attempt has ended. Provider events and stop requests are
    /// handled while the start request is pending. Active is only reached when
    /// the call-start event arrives.
    pub async fn start_session(
        &mut self,
        questions: &QuestionSet,
        user_override: Option<&str>,
    ) -> StartOutcome {
        if self.state() != SessionState::Idle {
            info!("Start ignored, session is {:?}", self.state());
            self.log.record("Start ignored: a session is already in flight");
            return StartOutcome::AlreadyInFlight;
        }

        if questions.is_empty() {
            self.alert("No interview context. Generate interview questions first.");
            return StartOutcome::NoQuestions;
        }

        info!("Starting interview session ({} questions)", questions.len());
        self.log.record("Starting interview process...");
        self.apply(SessionInput::StartRequested);
        self.view.send_modify(|v| {
            v.starting = true;
            v.last_failure = None;
        });

        // 1. Devices
        let permission = self.permissions.check().await;
        let status = self.permissions.status();
        self.view.send_modify(|v| v.permission_status = status);

        if let Err(reason) = permission {
            self.apply(SessionInput::PermissionsDenied);
            self.view.send_modify(|v| v.starting = false);
            self.alert(reason.to_string());
            return StartOutcome::PermissionDenied(reason);
        }

        // 2. Key
        let credential = match self.credentials.resolve(user_override) {
            Ok(credential) => credential,
            Err(e) => {
                error!("Credential resolution failed: {}", e);
                self.apply(SessionInput::Failed);
                self.view.send_modify(|v| {
                    v.starting = false;
                    v.credential_prompt_visible = true;
                });
                self.alert(format!("Cannot start interview: {}", e));
                return StartOutcome::NoCredential;
            }
        };

        self.apply(SessionInput::PermissionsGranted);

        // 3. Fresh handle, hooks bound before start is issued
        let config = CallConfig::build(&self.settings.defaults, questions);
        let id = HandleId::new();
        let events = EventSender::new(id, self.events_tx.clone());

        self.log
            .record(format!("Initializing provider session {} with key: {}", id, credential));

        let mut handle = match self.provider.connect(&credential, events) {
            Ok(handle) => handle,
            Err(e) => {
                error!("Provider init failed: {}", e);
                return self.fail_start(e);
            }
        };

        self.log.record("Calling start()...");
        let mut start = handle.start(config);
        self.session = Some(LiveSession { id, handle });

        // 4. Race the start request against the timeout, with events and
        // stop requests handled as they arrive
        let timer = tokio::time::sleep(START_TIMEOUT);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                result = &mut start => {
                    return match result {
                        Ok(()) => {
                            info!("Provider accepted start for session {}", id);
                            self.log.record("start() promise resolved");
                            StartOutcome::Connecting
                        }
                        Err(e) => {
                            warn!("Provider rejected start: {}", e);
                            self.fail_start(e)
                        }
                    };
                }
                _ = &mut timer => {
                    warn!("Provider did not accept start within {:?}", START_TIMEOUT);
                    self.abandon_start(start).await;
                    return self.fail_start(ProviderError::message(TIMEOUT_SENTINEL));
                }
                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event).await;
                    if let Some(outcome) = self.settled_while_starting() {
                        self.detach_start(id, start);
                        return outcome;
                    }
                }
                Some(command) = self.commands_rx.recv() => {
                    self.run_command(command).await;
                    if let Some(outcome) = self.settled_while_starting() {
                        self.detach_start(id, start);
                        return match outcome {
                            StartOutcome::Ended => StartOutcome::Stopped,
                            other => other,
                        };
                    }
                }
            }
        }
    }

    /// Whether an event or command has decided the pending start
    fn settled_while_starting(&self) -> Option<StartOutcome> {
        let view = self.view.borrow();
        match view.state {
            SessionState::Connecting => None,
            SessionState::Active => Some(StartOutcome::Active),
            _ => Some(match &view.last_failure {
                Some(failure) => StartOutcome::Failed(failure.classification),
                None => StartOutcome::Ended,
            }),
        }
    }

    /// User-initiated hang up; no-op unless a session is in flight
    pub async fn stop_session(&mut self) {
        if !self.state().is_in_flight() {
            debug!("Stop ignored, session is {:?}", self.state());
            self.log.record("Stop ignored: no session in flight");
            return;
        }

        info!("Stopping interview session");
        self.log.record("Stopping interview...");
        self.apply(SessionInput::StopRequested);
        self.end_session(true).await;
    }

    /// Flip the microphone; returns whether a mute instruction was sent
    pub fn toggle_mute(&mut self) -> bool {
        if !self.state().is_in_flight() {
            self.log.record("Mute toggle ignored: no session in flight");
            return false;
        }

        let Some(live) = self.session.as_mut() else {
            return false;
        };

        let mic_enabled = self.view.borrow().mic_enabled;
        live.handle.set_muted(mic_enabled);
        self.view.send_modify(|v| v.mic_enabled = !mic_enabled);

        self.log.record(if mic_enabled {
            "Microphone muted"
        } else {
            "Microphone unmuted"
        });
        true
    }

    /// Open the key dialog on request
    pub fn show_credential_prompt(&self) {
        self.view.send_modify(|v| v.credential_prompt_visible = true);
    }

    pub fn dismiss_credential_prompt(&self) {
        self.view.send_modify(|v| v.credential_prompt_visible = false);
    }

    /// Persist a newly entered key, close the prompt and start again with it
    pub async fn save_credential_and_retry(
        &mut self,
        key: &str,
        questions: &QuestionSet,
    ) -> Result<StartOutcome, CredentialError> {
        let key = self.credentials.persist(key)?;
        self.dismiss_credential_prompt();
        Ok(self.start_session(questions, Some(&key)).await)
    }

    /// Forget the saved key; later starts fall back to the deployment default
    pub fn reset_credential(&self) -> Result<(), CredentialError> {
        self.credentials.clear()?;
        self.dismiss_credential_prompt();
        Ok(())
    }

    /// Wait for the next provider event; stop requests arriving meanwhile are carried out
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            tokio::select! {
                event = self.events_rx.recv() => return event,
                Some(command) = self.commands_rx.recv() => self.run_command(command).await,
            }
        }
    }

    /// Handle every event already queued, in arrival order, then any queued
    /// stop request. Returns the number of events handled.
    pub async fn drain_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event).await;
            handled += 1;
        }
        while let Ok(command) = self.commands_rx.try_recv() {
            self.run_command(command).await;
        }
        handled
    }

    async fn run_command(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::Stop => self.stop_session().await,
        }
    }

    pub async fn handle_event(&mut self, event: SessionEvent) {
        if self.current_handle() != Some(event.handle) {
            debug!("Dropping {} from stale session {}", event.event.name(), event.handle);
            self.log.record(format!(
                "Ignoring {} from stale session {}",
                event.event.name(),
                event.handle
            ));
            return;
        }

        match event.event {
            ProviderEvent::CallStart => {
                self.log.record("Call started event received");
                if self.apply(SessionInput::ProviderCallStart) == SessionState::Active {
                    self.view.send_modify(|v| {
                        v.mic_enabled = true;
                        v.starting = false;
                        v.credential_prompt_visible = false;
                    });
                }
            }
            ProviderEvent::CallEnd => {
                self.log.record("Call ended event received");
                if self.apply(SessionInput::ProviderCallEnd) == SessionState::Ending {
                    self.end_session(false).await;
                    self.notify(UiNotice::ResultsReady);
                }
            }
            ProviderEvent::VolumeLevel(level) => {
                let level = if level.is_finite() {
                    level.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                self.view.send_modify(|v| v.volume_level = level);
            }
            ProviderEvent::Message(message) => {
                self.transcript.offer(&message);
            }
            ProviderEvent::Error(payload) => self.handle_provider_error(payload).await,
        }
    }

    async fn handle_provider_error(&mut self, payload: Value) {
        self.log.record_with("Provider Error Event:", payload.clone());

        let failure = classify::analyze(&payload);
        let during_start = self.state() == SessionState::Connecting;

        match failure.classification {
            ErrorClassification::Auth => {
                self.log.record(format!("Auth Error detected: {}", failure.message));
                self.fail_call(failure).await;
                self.view.send_modify(|v| v.credential_prompt_visible = true);
                self.alert(
                    "Authentication Failed: Invalid provider public key.\nPlease check your key in the settings.",
                );
            }
            ErrorClassification::Timeout | ErrorClassification::Transient => {
                let message = failure.message.clone();
                self.fail_call(failure).await;
                self.alert(format!("Failed to start interview session. Error: {}", message));
            }
            ErrorClassification::Unknown if during_start => {
                let message = failure.message.clone();
                self.fail_call(failure).await;
                self.alert(format!("Failed to start interview session. Error: {}", message));
            }
            ErrorClassification::Unknown => {
                warn!("Unclassified provider error: {}", failure.message);
                self.log.record(format!("Generic Error: {}", failure.message));
            }
        }
    }

    fn fail_start(&mut self, error: ProviderError) -> StartOutcome {
        self.log.record_with("Start Error Catch:", error.payload().clone());
        self.session = None;

        let failure = classify::analyze(error.payload());
        let classification = failure.classification;
        let message = failure.message.clone();

        self.apply(SessionInput::Failed);
        self.view.send_modify(|v| {
            v.starting = false;
            v.mic_enabled = false;
            v.last_failure = Some(failure);
        });

        match classification {
            ErrorClassification::Auth => {
                self.log.record("Authentication failed; asking for a new key");
                self.view.send_modify(|v| v.credential_prompt_visible = true);
            }
            ErrorClassification::Timeout => {
                self.alert("Connection timed out. Please check your internet or try again.");
            }
            _ => self.alert(format!("Failed to start interview: {}", message)),
        }

        StartOutcome::Failed(classification)
    }

    /// Drop the handle after a fatal provider error
    async fn fail_call(&mut self, failure: SessionFailure) {
        if let Some(mut live) = self.session.take() {
            if let Err(e) = live.handle.stop().await {
                debug!("Stop after failure on session {} errored: {}", live.id, e);
            }
        }

        self.view.send_modify(|v| {
            v.mic_enabled = false;
            v.volume_level = 0.0;
            v.starting = false;
            v.last_failure = Some(failure);
        });
        self.apply(SessionInput::Failed);
    }

    /// Ending -> Idle. `stop_handle` is false when the provider already hung up.
    async fn end_session(&mut self, stop_handle: bool) {
        if let Some(mut live) = self.session.take() {
            if stop_handle {
                if let Err(e) = live.handle.stop().await {
                    warn!("Failed to stop provider session {}: {}", live.id, e);
                    self.log.record(format!("stop() failed: {}", e));
                }
            }
        }

        self.view.send_modify(|v| {
            v.mic_enabled = false;
            v.volume_level = 0.0;
            v.starting = false;
        });
        self.apply(SessionInput::Ended);
    }

    /// Give up on a start that lost the timeout race: the handle is hung up
    /// now and the start request finishes in the background.
    async fn abandon_start(&mut self, pending: BoxFuture<'static, Result<(), ProviderError>>) {
        let Some(LiveSession { id, mut handle }) = self.session.take() else {
            return;
        };

        self.log
            .record(format!("Provider session {} flagged stale after timeout", id));

        if let Err(e) = handle.stop().await {
            warn!("Failed to hang up stale session {}: {}", id, e);
        }

        self.detach_start(id, pending);
    }

    /// Await an unsettled start request off the controller; its result is only logged
    fn detach_start(&self, id: HandleId, pending: BoxFuture<'static, Result<(), ProviderError>>) {
        let log = Arc::clone(&self.log);
        tokio::spawn(async move {
            match tokio::time::timeout(STALE_START_GRACE, pending).await {
                Ok(Ok(())) => {
                    log.record(format!("Late start result from session {} discarded", id));
                }
                Ok(Err(e)) => {
                    log.record_with(
                        format!("Late start failure from session {} discarded", id),
                        e.payload().clone(),
                    );
                }
                Err(_) => {
                    debug!("Start request of session {} never settled", id);
                    log.record(format!("Start request of session {} abandoned", id));
                }
            }
        });
    }

    fn apply(&mut self, input: SessionInput) -> SessionState {
        let from = self.state();
        let to = reduce(from, input);

        if from != to {
            info!("Session state {:?} -> {:?} ({:?})", from, to, input);
            self.log.record(format!("State: {:?} -> {:?}", from, to));
            self.view.send_modify(|v| v.state = to);
        }

        to
    }

    fn alert(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.log.record(format!("Alert: {}", message));
        self.notify(UiNotice::Alert(message));
    }

    fn notify(&self, notice: UiNotice) {
        if self.notices_tx.send(notice).is_err() {
            debug!("Notice receiver dropped");
        }
    }
}
