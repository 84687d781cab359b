//! Interview question generation
//!
//! The interview page consumes an ordered list of questions produced by an LLM.
//! This module holds both ends of that exchange: the server-side generator
//! that prompts the model, and the client the interview page calls.

mod client;
mod gemini;
mod parse;
mod types;

pub use client::{generate_questions, QuestionSetClient, QuestionSetProvider};
pub use gemini::{GeminiClient, QuestionGenerator, DEFAULT_GEMINI_MODEL};
pub use parse::{build_generation_prompt, parse_question_list, strip_code_fences};
pub use types::{
    GenerationResponse, InterviewQuestion, InterviewRequest, QuestionSet, DEFAULT_QUESTION_COUNT,
    MAX_QUESTION_COUNT,
};
