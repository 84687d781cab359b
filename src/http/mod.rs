//! HTTP API for the interview page
//!
//! - POST /api/questions - Generate interview questions for a role
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::ErrorResponse;
pub use routes::create_router;
pub use state::AppState;
