use super::state::AppState;
use crate::language::Language;
use crate::notify::Notification;
use crate::session::SessionState;
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SetLanguageRequest {
    /// Language tag ("kk-KZ" or "ru-RU")
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            error,
            code: status.as_u16(),
        }),
    )
        .into_response()
}

/// Turn a session service reply into a response
fn session_response(action: &str, result: Result<SessionState>) -> Response {
    match result {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(e) => {
            error!("Failed to {}: {:#}", action, e);
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Failed to {}: {}", action, e),
            )
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /session
/// Current session state
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    session_response("read session", state.session.state().await)
}

/// POST /session/start
/// Start listening
pub async fn start_listening(State(state): State<AppState>) -> impl IntoResponse {
    info!("HTTP request to start listening");
    session_response("start listening", state.session.start_listening().await)
}

/// POST /session/stop
/// Stop listening
pub async fn stop_listening(State(state): State<AppState>) -> impl IntoResponse {
    info!("HTTP request to stop listening");
    session_response("stop listening", state.session.stop_listening().await)
}

/// GET /session/transcript
/// Transcript accumulated so far
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.state().await {
        Ok(session) => (
            StatusCode::OK,
            Json(TranscriptResponse {
                transcript: session.transcript,
            }),
        )
            .into_response(),
        Err(e) => session_response("read transcript", Err(e)),
    }
}

/// DELETE /session/transcript
/// Clear the transcript
pub async fn clear_transcript(State(state): State<AppState>) -> impl IntoResponse {
    session_response("clear transcript", state.session.clear_transcript().await)
}

/// PUT /session/language
/// Switch recognition language
pub async fn set_language(
    State(state): State<AppState>,
    Json(req): Json<SetLanguageRequest>,
) -> impl IntoResponse {
    let language: Language = match req.language.parse() {
        Ok(language) => language,
        Err(e) => {
            warn!("Rejected language change: {}", e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    info!("HTTP request to switch language to {}", language);
    session_response("switch language", state.session.set_language(language).await)
}

/// GET /notifications
/// Recent user-visible notifications, oldest first
pub async fn get_notifications(State(state): State<AppState>) -> impl IntoResponse {
    let notifications: Vec<Notification> = state.notifications.recent();
    (StatusCode::OK, Json(notifications))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            message: "Server is running".to_string(),
        }),
    )
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    error_response(StatusCode::NOT_FOUND, "Page not found".to_string())
}
