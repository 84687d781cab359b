use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use prepwise_interview::{create_router, AppState, GenerationError, QuestionGenerator};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct FixedGenerator(&'static str);

#[async_trait::async_trait]
impl QuestionGenerator for FixedGenerator {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.0.to_string())
    }
}

struct BrokenGenerator;

#[async_trait::async_trait]
impl QuestionGenerator for BrokenGenerator {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Transport("connection refused".to_string()))
    }
}

fn question_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/questions")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_body() -> Value {
    json!({
        "jobRole": "Backend Engineer",
        "techStack": "Rust",
        "yearsOfExperience": 3,
        "questionCount": 1
    })
}

async fn send(state: AppState, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = create_router(state).oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let app = create_router(AppState::unconfigured("GEMINI_API_KEY"));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"OK");
    Ok(())
}

#[tokio::test]
async fn test_questions_ok() -> Result<()> {
    let state = AppState::new(Arc::new(FixedGenerator(
        "```json\n[{\"question\": \"What is borrowing?\", \"answer\": \"Temporary access.\"}]\n```",
    )));

    let (status, body) = send(state, question_request(valid_body())).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "questions": [{ "question": "What is borrowing?", "answer": "Temporary access." }] })
    );
    Ok(())
}

#[tokio::test]
async fn test_questions_malformed_returns_raw() -> Result<()> {
    let state = AppState::new(Arc::new(FixedGenerator("I cannot do that.")));

    let (status, body) = send(state, question_request(valid_body())).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Failed to generate valid JSON format", "raw": "I cannot do that." })
    );
    Ok(())
}

#[tokio::test]
async fn test_questions_invalid_request() -> Result<()> {
    let state = AppState::new(Arc::new(FixedGenerator("[]")));
    let mut body = valid_body();
    body["questionCount"] = json!(20);

    let (status, body) = send(state, question_request(body)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("Question count"));
    Ok(())
}

#[tokio::test]
async fn test_questions_without_key() -> Result<()> {
    let (status, body) = send(
        AppState::unconfigured("GEMINI_API_KEY"),
        question_request(valid_body()),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "GEMINI_API_KEY is not configured" }));
    Ok(())
}

#[tokio::test]
async fn test_questions_model_unreachable() -> Result<()> {
    let (status, body) = send(
        AppState::new(Arc::new(BrokenGenerator)),
        question_request(valid_body()),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Internal Server Error: failed to reach question service: connection refused"
    );
    Ok(())
}
