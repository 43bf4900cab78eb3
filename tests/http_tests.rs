// Tests for the HTTP control API
//
// The router is driven in-process with `tower::ServiceExt::oneshot`.

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use speech_session::engine::{EngineEvent, RecognitionSegment};
use speech_session::{
    create_router, AppState, Language, NotificationLog, RecognitionController, ScriptedCapability,
    SessionHandle,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app(capability: &ScriptedCapability) -> Router {
    let notifications = NotificationLog::default();
    let controller = RecognitionController::new(
        Arc::new(capability.clone()),
        Arc::new(notifications.clone()),
        Language::Kazakh,
    );
    let (session, _task) = SessionHandle::spawn(controller);
    create_router(AppState::new(session, notifications))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => request.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, json))
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let capability = ScriptedCapability::new();
    let app = app(&capability);

    let (status, body) = send(&app, Method::GET, "/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn test_start_read_transcript_and_stop() -> Result<()> {
    let capability = ScriptedCapability::new();
    let app = app(&capability);

    let (status, body) = send(&app, Method::POST, "/session/start", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_listening"], true);
    assert_eq!(body["language"], "kk-KZ");
    assert_eq!(body["phase"], "listening");

    capability.emit(EngineEvent::Result {
        result_index: 0,
        results: vec![RecognitionSegment::final_text("сәлем")],
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (status, body) = send(&app, Method::GET, "/session/transcript", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transcript"], "сәлем ");

    let (status, body) = send(&app, Method::POST, "/session/stop", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_listening"], false);

    let (_, body) = send(&app, Method::GET, "/notifications", None).await?;
    let keys: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["listening_started", "listening_stopped"]);

    Ok(())
}

#[tokio::test]
async fn test_clear_transcript() -> Result<()> {
    let capability = ScriptedCapability::new();
    let app = app(&capability);
    send(&app, Method::POST, "/session/start", None).await?;
    capability.emit(EngineEvent::Result {
        result_index: 0,
        results: vec![RecognitionSegment::interim("бір")],
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (status, body) = send(&app, Method::DELETE, "/session/transcript", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transcript"], "");
    assert_eq!(body["is_listening"], true);

    Ok(())
}

#[tokio::test]
async fn test_set_language() -> Result<()> {
    let capability = ScriptedCapability::new();
    let app = app(&capability);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/session/language",
        Some(serde_json::json!({ "language": "ru-RU" })),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "ru-RU");
    assert_eq!(capability.engine_count(), 2);

    Ok(())
}

#[tokio::test]
async fn test_set_unknown_language_is_rejected() -> Result<()> {
    let capability = ScriptedCapability::new();
    let app = app(&capability);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/session/language",
        Some(serde_json::json!({ "language": "en-US" })),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert_eq!(capability.engine_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() -> Result<()> {
    let capability = ScriptedCapability::new();
    let app = app(&capability);

    let (status, body) = send(&app, Method::GET, "/nope", None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);

    Ok(())
}
