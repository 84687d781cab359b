use super::state::AppState;
use crate::error::GenerationError;
use crate::questions::{generate_questions as run_generation, GenerationResponse, InterviewRequest};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// POST /api/questions
/// Generate an ordered question set for the requested role
pub async fn generate_questions(
    State(state): State<AppState>,
    Json(req): Json<InterviewRequest>,
) -> impl IntoResponse {
    info!(
        "Generating {} questions for {} ({} years)",
        req.question_count, req.job_role, req.years_of_experience
    );

    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response();
    }

    let Some(generator) = state.generator.as_ref() else {
        error!("{} is not configured", state.api_key_env);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("{} is not configured", state.api_key_env),
            }),
        )
            .into_response();
    };

    match run_generation(generator.as_ref(), &req).await {
        Ok(questions) => (
            StatusCode::OK,
            Json(GenerationResponse {
                questions: Some(questions),
                ..Default::default()
            }),
        )
            .into_response(),
        Err(GenerationError::Malformed { raw }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(GenerationResponse {
                error: Some("Failed to generate valid JSON format".to_string()),
                raw: Some(raw),
                ..Default::default()
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Error generating questions: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Internal Server Error: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
