use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::session::{CallDefaults, SessionSettings};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub call: CallSection,
    pub questions: QuestionsConfig,
    pub storage: StorageConfig,
    pub debug_log: DebugLogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Call provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CallSection {
    /// Environment variable holding the deployment's default public key
    pub env_key_var: String,
    /// Last-resort key; empty disables the fallback
    pub fallback_key: String,
    pub model_provider: String,
    pub model_name: String,
    pub voice_provider: String,
    pub voice_id: String,
    pub first_message: String,
    /// Interviewer prompt; `{questions}` is replaced by the numbered question list
    pub system_prompt_template: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuestionsConfig {
    /// Endpoint used by `QuestionSetClient`
    pub endpoint: String,
    pub gemini_model: String,
    pub api_key_env: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub credentials_path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebugLogConfig {
    pub capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "prepwise".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for CallSection {
    fn default() -> Self {
        let defaults = CallDefaults::default();
        Self {
            env_key_var: "VAPI_PUBLIC_KEY".to_string(),
            fallback_key: crate::credentials::FALLBACK_PUBLIC_KEY.to_string(),
            model_provider: defaults.model_provider,
            model_name: defaults.model_name,
            voice_provider: defaults.voice_provider,
            voice_id: defaults.voice_id,
            first_message: defaults.first_message,
            system_prompt_template: defaults.system_prompt_template,
        }
    }
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/api/questions".to_string(),
            gemini_model: crate::questions::DEFAULT_GEMINI_MODEL.to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            credentials_path: "~/.prepwise/credentials.json".to_string(),
        }
    }
}

impl Default for DebugLogConfig {
    fn default() -> Self {
        Self {
            capacity: crate::debug_log::DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Load from a TOML file (extension optional) with `PREPWISE__SECTION__KEY`
    /// environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("PREPWISE").separator("__"))
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            defaults: CallDefaults {
                model_provider: self.call.model_provider.clone(),
                model_name: self.call.model_name.clone(),
                voice_provider: self.call.voice_provider.clone(),
                voice_id: self.call.voice_id.clone(),
                first_message: self.call.first_message.clone(),
                system_prompt_template: self.call.system_prompt_template.clone(),
            },
        }
    }

    /// Credential file path with `~` and `$VARS` expanded
    pub fn credentials_path(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.storage.credentials_path)
            .with_context(|| format!("Failed to expand {}", self.storage.credentials_path))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }
}
