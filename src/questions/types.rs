use crate::error::GenerationError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_QUESTION_COUNT: u32 = 5;
pub const MAX_QUESTION_COUNT: u32 = 10;

fn default_question_count() -> u32 {
    DEFAULT_QUESTION_COUNT
}

/// What the candidate asked to be interviewed on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRequest {
    pub job_role: String,
    #[serde(default)]
    pub tech_stack: String,
    #[serde(default)]
    pub years_of_experience: i32,
    #[serde(default = "default_question_count")]
    pub question_count: u32,
}

impl InterviewRequest {
    pub fn new(job_role: impl Into<String>, tech_stack: impl Into<String>, years: i32) -> Self {
        Self {
            job_role: job_role.into(),
            tech_stack: tech_stack.into(),
            years_of_experience: years,
            question_count: DEFAULT_QUESTION_COUNT,
        }
    }

    pub fn with_question_count(mut self, count: u32) -> Self {
        self.question_count = count;
        self
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.job_role.trim().chars().count() < 2 {
            return Err(GenerationError::InvalidRequest("Job role is required".to_string()));
        }
        if self.tech_stack.trim().chars().count() < 2 {
            return Err(GenerationError::InvalidRequest("Tech stack is required".to_string()));
        }
        if self.years_of_experience < 0 {
            return Err(GenerationError::InvalidRequest(
                "Experience cannot be negative".to_string(),
            ));
        }
        if !(1..=MAX_QUESTION_COUNT).contains(&self.question_count) {
            return Err(GenerationError::InvalidRequest(format!(
                "Question count must be between 1 and {}",
                MAX_QUESTION_COUNT
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    /// Suggested answer or key points to listen for
    #[serde(default)]
    pub answer: String,
}

/// Ordered interview questions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet(Vec<InterviewQuestion>);

impl QuestionSet {
    pub fn new(questions: Vec<InterviewQuestion>) -> Self {
        Self(questions)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterviewQuestion> {
        self.0.iter()
    }

    /// "1. first\n2. second" as fed to the interviewer prompt
    pub fn numbered_list(&self) -> String {
        self.0
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {}", i + 1, q.question))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn into_inner(self) -> Vec<InterviewQuestion> {
        self.0
    }
}

impl From<Vec<InterviewQuestion>> for QuestionSet {
    fn from(questions: Vec<InterviewQuestion>) -> Self {
        Self(questions)
    }
}

/// Body of the question endpoint's response, success or failure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<QuestionSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}
