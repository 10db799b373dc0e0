//! Integration tests for the dialog HTTP endpoints.
//!
//! Drives the full router (identity middleware, handler, dispatch pipeline)
//! against the in-memory repository and scripted upstreams.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use dialog_gateway::adapters::http::dialog::SESSION_ID_HEADER;
use dialog_gateway::adapters::http::{dialog_routes, DialogHandlers};
use dialog_gateway::adapters::identity::UserIdTokenVerifier;
use dialog_gateway::adapters::memory::InMemoryDialogRepository;
use dialog_gateway::adapters::upstream::ScriptedUpstream;
use dialog_gateway::application::{DispatchDialogHandler, UpstreamRegistry};
use dialog_gateway::domain::dialog::{EnvelopeStyle, Mode, UpstreamTarget};
use dialog_gateway::domain::foundation::{DomainError, SessionId};
use dialog_gateway::domain::report::ReportKind;
use dialog_gateway::ports::{RawChunk, UpstreamError};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    repository: InMemoryDialogRepository,
    agent: ScriptedUpstream,
    review: ScriptedUpstream,
}

fn test_app() -> TestApp {
    let repository = InMemoryDialogRepository::new();
    let agent = ScriptedUpstream::new();
    let review = ScriptedUpstream::new();

    let mut registry = UpstreamRegistry::new();
    registry
        .register(
            Mode::Agent,
            UpstreamTarget::remote(
                "agent",
                "http://agent.test/agent",
                "question",
                EnvelopeStyle::Ndjson,
                Duration::from_secs(5),
            ),
            Arc::new(agent.clone()),
        )
        .register(
            Mode::CodeReview,
            UpstreamTarget::remote(
                "review",
                "http://review.test/review",
                "code",
                EnvelopeStyle::SingleDocument,
                Duration::from_secs(5),
            )
            .with_report_hint(ReportKind::CodeReview)
            .with_static_field("stream", false),
            Arc::new(review.clone()),
        );

    let dispatch = DispatchDialogHandler::new(Arc::new(repository.clone()), Arc::new(registry));
    let router = dialog_routes(
        DialogHandlers::new(Arc::new(dispatch)),
        Arc::new(UserIdTokenVerifier),
    );

    TestApp {
        router,
        repository,
        agent,
        review,
    }
}

fn dialog_request(token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/dialog")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn ndjson(lines: &[Value]) -> RawChunk {
    let mut text = String::new();
    for line in lines {
        text.push_str(&line.to_string());
        text.push('\n');
    }
    RawChunk::Data(text.into_bytes())
}

// =============================================================================
// POST /dialog
// =============================================================================

#[tokio::test]
async fn new_session_streams_answer_and_records_transcript() {
    let app = test_app();
    app.agent.script(vec![ndjson(&[
        json!({"status": "stream_started"}),
        json!({"chunk": "SOLID is "}),
        json!({"chunk": "five principles."}),
        json!({"status": "completed"}),
    ])]);

    let response = app
        .router
        .oneshot(dialog_request(
            Some("7"),
            json!({"mode": "agent", "question": "What is SOLID?", "session_id": -1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SESSION_ID_HEADER], "1");
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let text = body_text(response).await;
    assert_eq!(
        text,
        "Connecting to agent...\nConnected.\n\nSOLID is five principles."
    );

    let session = SessionId::first();
    let turns = app.repository.turns_for(session);
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].question, "What is SOLID?");
    assert_eq!(turns[0].answer, text);
    assert_eq!(app.repository.sessions()[0].name(), "What is SO");
}

#[tokio::test]
async fn numeric_mode_and_existing_session_are_accepted() {
    let app = test_app();
    let report = json!({
        "designPatterns": [
            {"pattern": "Singleton", "classes": ["Config"], "description": "Single shared instance."}
        ],
        "designIssues": [],
        "qualityScore": 87,
        "suggestions": ["Extract an interface."]
    });
    let document = json!({
        "status": "success",
        "review_result": report.to_string(),
        "processing_time": 1.2
    });
    // the service sends one JSON document, split here across two reads
    let body = document.to_string().into_bytes();
    let (head, tail) = body.split_at(body.len() / 2);
    app.review.script(vec![
        RawChunk::Data(head.to_vec()),
        RawChunk::Data(tail.to_vec()),
    ]);

    let response = app
        .router
        .oneshot(dialog_request(
            Some("Bearer 7"),
            json!({"mode": 5, "question": "class Config {}", "session_id": 42}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SESSION_ID_HEADER], "42");
    let text = body_text(response).await;
    assert!(text.contains("## Quality Score"));
    assert!(text.contains("**87/100**"));
    assert!(text.contains("Singleton"));
    assert!(text.contains("Config"));
    assert!(!text.contains("review_result"));

    assert!(app.repository.sessions().is_empty());
    assert_eq!(app.repository.turns_for(SessionId::new(42).unwrap()).len(), 1);

    let sent = app.review.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].question, "class Config {}");
}

#[tokio::test]
async fn upstream_failure_is_reported_inline() {
    let app = test_app();
    app.agent.refuse(UpstreamError::status(502, "bad gateway"));

    let response = app
        .router
        .oneshot(dialog_request(
            Some("7"),
            json!({"mode": "agent", "question": "hello", "session_id": -1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.starts_with("Connecting to agent...\n"));
    assert!(text.contains("[stream interrupted: upstream returned HTTP 502: bad gateway]"));
    assert_eq!(app.repository.turns_for(SessionId::first())[0].answer, text);
}

#[tokio::test]
async fn failed_persistence_is_appended_to_stream() {
    let app = test_app();
    app.repository.fail_appends(DomainError::database("disk full"));
    app.agent.script(vec![ndjson(&[json!({"chunk": "answer"})])]);

    let response = app
        .router
        .oneshot(dialog_request(
            Some("7"),
            json!({"mode": "agent", "question": "hello", "session_id": 3}),
        ))
        .await
        .unwrap();

    let text = body_text(response).await;
    assert!(text.contains("answer"));
    assert!(text.ends_with("[transcript not saved: disk full]\n"));
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .router
        .oneshot(dialog_request(
            None,
            json!({"mode": "agent", "question": "hello", "session_id": -1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.agent.open_count(), 0);
}

#[tokio::test]
async fn malformed_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .router
        .oneshot(dialog_request(
            Some("not-a-user"),
            json!({"mode": "agent", "question": "hello", "session_id": -1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn empty_question_is_bad_request() {
    let app = test_app();

    let response = app
        .router
        .oneshot(dialog_request(
            Some("7"),
            json!({"mode": "agent", "question": "   ", "session_id": -1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.repository.sessions().is_empty());
    assert_eq!(app.agent.open_count(), 0);
}

#[tokio::test]
async fn unknown_mode_is_bad_request() {
    let app = test_app();

    let response = app
        .router
        .oneshot(dialog_request(
            Some("7"),
            json!({"mode": 9, "question": "hello", "session_id": -1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_json_is_bad_request() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/dialog")
        .header("content-type", "application/json")
        .header("Authorization", "7")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unconfigured_mode_is_unavailable_without_creating_session() {
    let app = test_app();

    let response = app
        .router
        .oneshot(dialog_request(
            Some("7"),
            json!({"mode": "local", "question": "hello", "session_id": -1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(app.repository.sessions().is_empty());
}

// =============================================================================
// GET /health
// =============================================================================

#[tokio::test]
async fn health_needs_no_identity() {
    let app = test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}
