//! Process-wide diagnostic log
//!
//! Every component records what it did here so a session can be reconstructed
//! after the fact. Entries are kept newest-first in a bounded ring buffer; when
//! full, the oldest entry is evicted. Nothing reads the log to make decisions.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 200;

static GLOBAL: OnceLock<Arc<DebugLog>> = OnceLock::new();

/// A single diagnostic record
#[derive(Debug, Clone, Serialize)]
pub struct DebugLogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub payload: Option<Value>,
}

impl fmt::Display for DebugLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)?;
        if let Some(payload) = &self.payload {
            write!(f, " {}", payload)?;
        }
        Ok(())
    }
}

pub struct DebugLog {
    capacity: usize,
    entries: Mutex<VecDeque<DebugLogEntry>>,
}

impl DebugLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Shared log, created on first use with the default capacity
    pub fn global() -> Arc<DebugLog> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(DebugLog::new(DEFAULT_CAPACITY))))
    }

    /// Install the shared log with a specific capacity.
    ///
    /// Returns the already-installed log if one exists.
    pub fn init_global(capacity: usize) -> Arc<DebugLog> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(DebugLog::new(capacity))))
    }

    pub fn record(&self, message: impl Into<String>) {
        self.push(message.into(), None);
    }

    pub fn record_with(&self, message: impl Into<String>, payload: Value) {
        self.push(message.into(), Some(payload));
    }

    fn push(&self, message: String, payload: Option<Value>) {
        match &payload {
            Some(p) => debug!(target: "prepwise::debug_log", "{} {}", message, p),
            None => debug!(target: "prepwise::debug_log", "{}", message),
        }

        let entry = DebugLogEntry {
            timestamp: Local::now(),
            message,
            payload,
        };

        // A poisoned lock only means another recorder panicked mid-push; the
        // buffer itself is still well formed.
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Snapshot of all entries, newest first
    pub fn entries(&self) -> Vec<DebugLogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<DebugLogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.front().cloned()
    }

    /// Rendered lines for an on-screen console, newest first
    pub fn lines(&self) -> Vec<String> {
        self.entries().iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
