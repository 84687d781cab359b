use super::gemini::QuestionGenerator;
use super::parse::{build_generation_prompt, parse_question_list};
use super::types::{GenerationResponse, InterviewRequest, QuestionSet};
use crate::error::GenerationError;
use tracing::{error, info};

/// Source of interview questions as seen by the interview page
#[async_trait::async_trait]
pub trait QuestionSetProvider: Send + Sync {
    /// One attempt, no retry; any failure is terminal for this request
    async fn generate(&self, request: &InterviewRequest) -> Result<QuestionSet, GenerationError>;
}

/// Validate, prompt the model, and parse its answer
pub async fn generate_questions(
    generator: &dyn QuestionGenerator,
    request: &InterviewRequest,
) -> Result<QuestionSet, GenerationError> {
    request.validate()?;

    let prompt = build_generation_prompt(request);
    let raw = generator.complete(&prompt).await?;

    match parse_question_list(&raw) {
        Ok(questions) => {
            info!(
                "Generated {} questions for {}",
                questions.len(),
                request.job_role
            );
            Ok(questions)
        }
        Err(e) => {
            error!("Failed to parse model response: {}", raw);
            Err(e)
        }
    }
}

/// Calls the question HTTP endpoint
pub struct QuestionSetClient {
    http: reqwest::Client,
    endpoint: String,
}

impl QuestionSetClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait::async_trait]
impl QuestionSetProvider for QuestionSetClient {
    async fn generate(&self, request: &InterviewRequest) -> Result<QuestionSet, GenerationError> {
        request.validate()?;

        info!("Requesting interview questions from {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let body: GenerationResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Remote(format!("unreadable response ({}): {}", status, e)))?;

        into_question_set(body)
    }
}

fn into_question_set(body: GenerationResponse) -> Result<QuestionSet, GenerationError> {
    match body {
        GenerationResponse {
            questions: Some(questions),
            ..
        } if !questions.is_empty() => Ok(questions),
        GenerationResponse { raw: Some(raw), .. } => Err(GenerationError::Malformed { raw }),
        GenerationResponse { error, .. } => Err(GenerationError::Remote(
            error.unwrap_or_else(|| "No questions returned from AI".to_string()),
        )),
    }
}
