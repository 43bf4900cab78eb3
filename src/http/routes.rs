use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/session", get(handlers::get_session))
        .route("/session/start", post(handlers::start_listening))
        .route("/session/stop", post(handlers::stop_listening))
        .route(
            "/session/transcript",
            get(handlers::get_transcript).delete(handlers::clear_transcript),
        )
        .route("/session/language", put(handlers::set_language))
        // Notifications
        .route("/notifications", get(handlers::get_notifications))
        .fallback(handlers::not_found)
        // Browser front-ends talk to this API from another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
