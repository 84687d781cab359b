use crate::questions::QuestionGenerator;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Absent when no model key is configured; requests then fail with 500
    pub generator: Option<Arc<dyn QuestionGenerator>>,

    /// Name of the variable that should hold the model key, for error messages
    pub api_key_env: String,
}

impl AppState {
    pub fn new(generator: Arc<dyn QuestionGenerator>) -> Self {
        Self {
            generator: Some(generator),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }

    pub fn unconfigured(api_key_env: impl Into<String>) -> Self {
        Self {
            generator: None,
            api_key_env: api_key_env.into(),
        }
    }
}
