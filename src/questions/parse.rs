use super::types::{InterviewQuestion, InterviewRequest, QuestionSet};
use crate::error::GenerationError;

/// Remove markdown code fences the model wraps around JSON despite being told not to
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse model output into questions
pub fn parse_question_list(raw: &str) -> Result<QuestionSet, GenerationError> {
    let cleaned = strip_code_fences(raw);

    let questions: Vec<InterviewQuestion> =
        serde_json::from_str(&cleaned).map_err(|_| GenerationError::Malformed {
            raw: raw.to_string(),
        })?;

    if questions.is_empty() || questions.iter().any(|q| q.question.trim().is_empty()) {
        return Err(GenerationError::Malformed {
            raw: raw.to_string(),
        });
    }

    Ok(QuestionSet::new(questions))
}

pub fn build_generation_prompt(request: &InterviewRequest) -> String {
    let tech_stack = if request.tech_stack.trim().is_empty() {
        "General"
    } else {
        request.tech_stack.trim()
    };

    format!(
        "You are an expert technical interviewer.
Generate {count} technical interview questions for a {role} position.
Tech Stack: {stack}.
Experience Level: {years} years.

Return the response STRICTLY as a JSON array of objects, where each object has:
- \"question\": The interview question.
- \"answer\": A brief suggested answer or key points to look for.

Do not include any markdown formatting (like ```json). Just the raw JSON array.",
        count = request.question_count,
        role = request.job_role.trim(),
        stack = tech_stack,
        years = request.years_of_experience,
    )
}
