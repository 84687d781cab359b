use super::store::CredentialStore;
use crate::debug_log::DebugLog;
use crate::error::CredentialError;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Storage slot holding the last key the user entered
pub const MANUAL_KEY_SLOT: &str = "vapi_manual_key";

/// Shared public demo key used when nothing else is configured
pub const FALLBACK_PUBLIC_KEY: &str = "vapi-public-prepwise-demo-0000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CredentialSource {
    /// Typed by the user, now or in an earlier session
    UserOverride,
    EnvironmentDefault,
    HardcodedFallback,
}

/// A resolved provider key; always non-empty and trimmed
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    source: CredentialSource,
}

impl Credential {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Key with only its edges visible, safe for logs
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.token.chars().collect();
        if chars.len() <= 9 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..5].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.masked())
            .field("source", &self.source)
            .finish()
    }
}

fn normalize(candidate: Option<&str>) -> Option<String> {
    candidate
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
    env_default: Option<String>,
    fallback: Option<String>,
    log: Arc<DebugLog>,
}

impl CredentialResolver {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        env_default: Option<String>,
        fallback: Option<String>,
    ) -> Self {
        Self {
            store,
            env_default,
            fallback,
            log: DebugLog::global(),
        }
    }

    /// Read the environment default from `env_var`
    pub fn from_env(store: Arc<dyn CredentialStore>, env_var: &str, fallback: Option<String>) -> Self {
        Self::new(store, std::env::var(env_var).ok(), fallback)
    }

    pub fn with_debug_log(mut self, log: Arc<DebugLog>) -> Self {
        self.log = log;
        self
    }

    /// Pick the first usable key in priority order
    pub fn resolve(&self, user_override: Option<&str>) -> Result<Credential, CredentialError> {
        let persisted = match self.store.get(MANUAL_KEY_SLOT) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read persisted key, skipping: {:#}", e);
                self.log.record(format!("Persisted key unreadable: {}", e));
                None
            }
        };

        let chain = [
            (normalize(user_override), CredentialSource::UserOverride),
            (normalize(persisted.as_deref()), CredentialSource::UserOverride),
            (normalize(self.env_default.as_deref()), CredentialSource::EnvironmentDefault),
            (normalize(self.fallback.as_deref()), CredentialSource::HardcodedFallback),
        ];

        let credential = chain
            .into_iter()
            .find_map(|(token, source)| token.map(|token| Credential { token, source }))
            .ok_or(CredentialError::Unavailable)?;

        info!("Resolved credential {} from {:?}", credential, credential.source);
        self.log.record(format!("Using Key: {}", credential));

        Ok(credential)
    }

    /// Save the user's key so later sessions pick it up
    pub fn persist(&self, user_override: &str) -> Result<String, CredentialError> {
        let key = normalize(Some(user_override)).ok_or(CredentialError::Empty)?;
        self.store.set(MANUAL_KEY_SLOT, &key)?;
        self.log.record("Manual key saved to storage.");
        Ok(key)
    }

    /// The previously saved key, if any
    pub fn persisted(&self) -> Result<Option<String>, CredentialError> {
        Ok(normalize(self.store.get(MANUAL_KEY_SLOT)?.as_deref()))
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        self.store.remove(MANUAL_KEY_SLOT)?;
        self.log.record("Manual key cleared from storage.");
        Ok(())
    }
}
