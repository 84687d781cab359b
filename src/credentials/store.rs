use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Durable client-side key-value storage
pub trait CredentialStore: Send + Sync {
    fn get(&self, slot: &str) -> Result<Option<String>>;

    fn set(&self, slot: &str, value: &str) -> Result<()>;

    fn remove(&self, slot: &str) -> Result<()>;
}

/// Slots kept in a single JSON object on disk
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles from this process
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt credential store at {}", self.path.display()))
    }

    fn write_all(&self, slots: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create credential store directory")?;
        }

        let json = serde_json::to_string_pretty(slots)?;

        // Write-then-rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, slot: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_all()?.remove(slot))
    }

    fn set(&self, slot: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut slots = self.read_all()?;
        slots.insert(slot.to_string(), value.to_string());
        self.write_all(&slots)?;

        info!("Saved slot '{}' to {}", slot, self.path.display());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut slots = self.read_all()?;
        if slots.remove(slot).is_none() {
            debug!("Slot '{}' already absent", slot);
            return Ok(());
        }
        self.write_all(&slots)
    }
}

/// Non-durable store for tests and embedded use
#[derive(Default)]
pub struct MemoryCredentialStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, slot: &str) -> Result<Option<String>> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.remove(slot);
        Ok(())
    }
}
