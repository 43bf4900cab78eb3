//! HTTP API for controlling the recognition session
//!
//! This module provides a REST API over the session service:
//! - GET /health - Health check
//! - GET /session - Session state
//! - POST /session/start - Start listening
//! - POST /session/stop - Stop listening
//! - GET /session/transcript - Current transcript
//! - DELETE /session/transcript - Clear the transcript
//! - PUT /session/language - Switch recognition language
//! - GET /notifications - Recent user-visible notifications

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
