use crate::questions::QuestionSet;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// How long the provider gets to accept a start request
pub const START_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_PROMPT_TEMPLATE: &str = "You are a professional technical interviewer named \"Sarah\".
Your goal is to interview the candidate using these specific questions:
{questions}
Rules: Ask ONE question at a time. Wait for answer. Be professional.";

/// Provider-facing defaults every call starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDefaults {
    pub model_provider: String,
    pub model_name: String,
    pub voice_provider: String,
    pub voice_id: String,
    /// Opening line spoken by the interviewer
    pub first_message: String,
    /// `{questions}` is replaced with the numbered question list
    pub system_prompt_template: String,
}

impl Default for CallDefaults {
    fn default() -> Self {
        Self {
            model_provider: "openai".to_string(),
            model_name: "gpt-3.5-turbo".to_string(),
            voice_provider: "11labs".to_string(),
            voice_id: "paula".to_string(),
            first_message: "Hello! I am ready to start. Can you hear me?".to_string(),
            system_prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

/// Controller tuning. The start timeout is fixed at [`START_TIMEOUT`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSettings {
    pub defaults: CallDefaults,
}

/// Everything the provider needs to run one interview call.
///
/// Built fresh for each start attempt and handed over by value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallConfig {
    pub model_provider: String,
    pub model_name: String,
    pub system_prompt: String,
    pub voice_provider: String,
    pub voice_id: String,
    pub first_message: String,
}

impl CallConfig {
    pub fn build(defaults: &CallDefaults, questions: &QuestionSet) -> Self {
        let system_prompt = defaults
            .system_prompt_template
            .replace("{questions}", &questions.numbered_list());

        Self {
            model_provider: defaults.model_provider.clone(),
            model_name: defaults.model_name.clone(),
            system_prompt,
            voice_provider: defaults.voice_provider.clone(),
            voice_id: defaults.voice_id.clone(),
            first_message: defaults.first_message.clone(),
        }
    }

    /// Nested assistant shape expected by the provider's start call
    pub fn to_provider_payload(&self) -> Value {
        json!({
            "model": {
                "provider": self.model_provider,
                "model": self.model_name,
                "messages": [
                    { "role": "system", "content": self.system_prompt }
                ]
            },
            "voice": {
                "provider": self.voice_provider,
                "voiceId": self.voice_id
            },
            "firstMessage": self.first_message
        })
    }
}
