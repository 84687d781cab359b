// Shared fakes for the platform media layer and the voice provider
//
// Each fake records what the controller asked of it so tests can assert on
// handle creation, mute forwarding and hang-ups.

#![allow(dead_code)]

use futures::future::BoxFuture;
use prepwise_interview::credentials::FALLBACK_PUBLIC_KEY;
use prepwise_interview::permissions::{MediaAccessError, MediaConstraints, TrackInfo};
use prepwise_interview::session::SessionSettings;
use prepwise_interview::{
    CallConfig, CallProvider, CallSessionController, Credential, CredentialResolver, DebugLog,
    EventSender, InterviewQuestion, MediaDevices, MediaStream, MemoryCredentialStore,
    PermissionGate, ProviderError, ProviderEvent, ProviderMessage, ProviderSession, QuestionSet,
    UiNotice,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// ============================================================================
// Media devices
// ============================================================================

pub struct FakeStream {
    releases: Arc<AtomicUsize>,
}

impl MediaStream for FakeStream {
    fn id(&self) -> &str {
        "stream-1"
    }

    fn tracks(&self) -> Vec<TrackInfo> {
        vec![
            TrackInfo {
                kind: "audio".to_string(),
                label: "Built-in Microphone".to_string(),
                ready_state: "live".to_string(),
            },
            TrackInfo {
                kind: "video".to_string(),
                label: "FaceTime HD Camera".to_string(),
                ready_state: "live".to_string(),
            },
        ]
    }

    fn release(self: Box<Self>) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeMedia {
    failure: Mutex<Option<MediaAccessError>>,
    pub requests: AtomicUsize,
    pub releases: Arc<AtomicUsize>,
}

impl FakeMedia {
    pub fn granting() -> Arc<Self> {
        Arc::new(Self {
            failure: Mutex::new(None),
            requests: AtomicUsize::new(0),
            releases: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn failing(kind: &str, message: &str) -> Arc<Self> {
        let media = Self::granting();
        media.fail_with(kind, message);
        media
    }

    pub fn fail_with(&self, kind: &str, message: &str) {
        *self.failure.lock().unwrap() = Some(MediaAccessError::new(kind, message));
    }

    pub fn grant(&self) {
        *self.failure.lock().unwrap() = None;
    }
}

#[async_trait::async_trait]
impl MediaDevices for FakeMedia {
    async fn request_access(
        &self,
        constraints: MediaConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaAccessError> {
        assert!(constraints.audio && constraints.video);
        self.requests.fetch_add(1, Ordering::SeqCst);

        match self.failure.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(Box::new(FakeStream {
                releases: Arc::clone(&self.releases),
            })),
        }
    }
}

// ============================================================================
// Voice provider
// ============================================================================

#[derive(Debug, Clone)]
pub enum StartBehavior {
    Resolve,
    Reject(Value),
    /// Never settles
    Hang,
}

/// What one provider handle saw
pub struct SessionRecord {
    pub events: EventSender,
    pub credential: Credential,
    pub config: Mutex<Option<CallConfig>>,
    /// Assistant definition as it would go over the wire
    pub payload: Mutex<Option<Value>>,
    pub mutes: Mutex<Vec<bool>>,
    pub stops: AtomicUsize,
}

impl SessionRecord {
    pub fn emit(&self, event: ProviderEvent) {
        assert!(self.events.send(event), "controller dropped");
    }

    pub fn say(&self, transcript_type: &str, role: &str, text: &str) {
        self.emit(ProviderEvent::Message(ProviderMessage::transcript(
            transcript_type,
            role,
            text,
        )));
    }
}

struct FakeSession {
    record: Arc<SessionRecord>,
    behavior: StartBehavior,
}

#[async_trait::async_trait]
impl ProviderSession for FakeSession {
    fn start(&mut self, config: CallConfig) -> BoxFuture<'static, Result<(), ProviderError>> {
        *self.record.payload.lock().unwrap() = Some(config.to_provider_payload());
        *self.record.config.lock().unwrap() = Some(config);
        match self.behavior.clone() {
            StartBehavior::Resolve => Box::pin(async { Ok(()) }),
            StartBehavior::Reject(payload) => Box::pin(async move { Err(ProviderError(payload)) }),
            StartBehavior::Hang => Box::pin(futures::future::pending()),
        }
    }

    async fn stop(&mut self) -> Result<(), ProviderError> {
        self.record.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) {
        self.record.mutes.lock().unwrap().push(muted);
    }
}

pub struct FakeProvider {
    behavior: Mutex<StartBehavior>,
    pub connects: AtomicUsize,
    records: Mutex<Vec<Arc<SessionRecord>>>,
}

impl FakeProvider {
    pub fn new(behavior: StartBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(behavior),
            connects: AtomicUsize::new(0),
            records: Mutex::new(Vec::new()),
        })
    }

    pub fn set_behavior(&self, behavior: StartBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Most recently created handle
    pub fn last(&self) -> Arc<SessionRecord> {
        Arc::clone(self.records.lock().unwrap().last().expect("no session created"))
    }
}

impl CallProvider for FakeProvider {
    fn connect(
        &self,
        credential: &Credential,
        events: EventSender,
    ) -> Result<Box<dyn ProviderSession>, ProviderError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let record = Arc::new(SessionRecord {
            events,
            credential: credential.clone(),
            config: Mutex::new(None),
            payload: Mutex::new(None),
            mutes: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
        });
        self.records.lock().unwrap().push(Arc::clone(&record));

        Ok(Box::new(FakeSession {
            record,
            behavior: self.behavior.lock().unwrap().clone(),
        }))
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub controller: CallSessionController,
    pub provider: Arc<FakeProvider>,
    pub media: Arc<FakeMedia>,
    pub store: Arc<MemoryCredentialStore>,
    pub log: Arc<DebugLog>,
    pub notices: mpsc::UnboundedReceiver<UiNotice>,
}

impl Harness {
    pub fn new(behavior: StartBehavior) -> Self {
        Self::with_media(behavior, FakeMedia::granting())
    }

    pub fn with_media(behavior: StartBehavior, media: Arc<FakeMedia>) -> Self {
        Self::build(behavior, media, None, Some(FALLBACK_PUBLIC_KEY.to_string()))
    }

    pub fn build(
        behavior: StartBehavior,
        media: Arc<FakeMedia>,
        env_default: Option<String>,
        fallback: Option<String>,
    ) -> Self {
        let log = Arc::new(DebugLog::new(500));
        let provider = FakeProvider::new(behavior);
        let store = Arc::new(MemoryCredentialStore::new());

        let permissions = PermissionGate::new(media.clone()).with_debug_log(Arc::clone(&log));
        let credentials = CredentialResolver::new(store.clone(), env_default, fallback)
            .with_debug_log(Arc::clone(&log));

        let mut controller = CallSessionController::new(
            SessionSettings::default(),
            provider.clone(),
            permissions,
            credentials,
        )
        .with_debug_log(Arc::clone(&log));
        let notices = controller.take_notices().expect("notices already taken");

        Self {
            controller,
            provider,
            media,
            store,
            log,
            notices,
        }
    }

    /// All notices emitted so far
    pub fn notices(&mut self) -> Vec<UiNotice> {
        let mut out = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            out.push(notice);
        }
        out
    }

    pub fn log_contains(&self, needle: &str) -> bool {
        self.log.entries().iter().any(|e| e.message.contains(needle))
    }
}

pub fn sample_questions() -> QuestionSet {
    QuestionSet::new(vec![
        InterviewQuestion {
            question: "Explain ownership in Rust.".to_string(),
            answer: "Each value has a single owner.".to_string(),
        },
        InterviewQuestion {
            question: "What is a trait object?".to_string(),
            answer: "Dynamic dispatch through a vtable.".to_string(),
        },
        InterviewQuestion {
            question: "How does async/await work?".to_string(),
            answer: "Futures polled by an executor.".to_string(),
        },
    ])
}

pub fn alerts(notices: &[UiNotice]) -> Vec<String> {
    notices
        .iter()
        .filter_map(|n| match n {
            UiNotice::Alert(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}
