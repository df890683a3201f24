//! Integration tests for API routes.
//!
//! Uses `tower::ServiceExt` to drive the Axum router without a real HTTP
//! server. State is backed by `MemoryStore` and a `RecordingTransport`, so
//! nothing leaves the process.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use kb_slack_api::routes::create_router;
use kb_slack_api::state::AppState;
use kb_slack_common::config::NotifierConfig;
use kb_slack_common::types::{IntegrationSettings, Project};
use kb_slack_notifier::Notifier;
use kb_slack_notifier::store::MemoryStore;
use kb_slack_notifier::transport::RecordingTransport;

// ============================================================
// Helpers
// ============================================================

const USER_HOOK: &str = "https://hooks.slack.com/services/T/B/user";

fn test_config() -> NotifierConfig {
    NotifierConfig {
        application_url: "https://kb.example.com".to_string(),
        ..Default::default()
    }
}

fn test_store() -> MemoryStore {
    MemoryStore::new()
        .with_project(Project {
            id: 1,
            name: "Demo".to_string(),
        })
        .with_user_settings(
            7,
            IntegrationSettings {
                webhook_url: Some(USER_HOOK.to_string()),
                channel: Some("@alice".to_string()),
                mention_id: None,
            },
        )
}

fn build_test_state(store: MemoryStore) -> (AppState, RecordingTransport) {
    let transport = RecordingTransport::new();
    let notifier = Notifier::new(Arc::new(store), Arc::new(transport.clone()), test_config());
    (AppState::new(notifier), transport)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================
// Health
// ============================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (state, _) = build_test_state(test_store());
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "kb-slack-api");
}

// ============================================================
// Notifications
// ============================================================

#[tokio::test]
async fn test_notify_user_renders_and_submits() {
    let (state, transport) = build_test_state(test_store());
    let app = create_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/notifications/users/7",
            serde_json::json!({
                "event": "task.create",
                "actor": "Alice",
                "data": {
                    "task": {
                        "id": 42,
                        "title": "Fix bug",
                        "project_id": 1,
                        "project_name": "Demo",
                        "description": ""
                    }
                }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["sent"], 1);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, USER_HOOK);
    assert_eq!(sent[0].body["channel"], "@alice");
    assert_eq!(sent[0].body["username"], "Kanboard");
    let text = sent[0].body["text"].as_str().unwrap();
    assert!(text.starts_with("**[Demo]**\n**Alice** created the task #42\n"));
    assert!(text.contains("task_id=42"));
    assert!(text.ends_with("|Fix bug>"));
}

#[tokio::test]
async fn test_notify_user_overdue_digest() {
    let (state, transport) = build_test_state(test_store());
    let app = create_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/notifications/users/7",
            serde_json::json!({
                "event": "task.overdue",
                "data": {
                    "tasks": [
                        {"id": 1, "title": "One", "project_id": 1, "project_name": "Demo"},
                        {"id": 2, "title": "Two", "project_id": 1, "project_name": "Demo"}
                    ]
                }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["sent"], 2);
    assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn test_notify_project_without_webhook_sends_nothing() {
    let (state, transport) = build_test_state(test_store());
    let app = create_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/notifications/projects/1",
            serde_json::json!({
                "event": "comment.create",
                "data": {
                    "task": {"id": 42, "title": "Fix bug", "project_id": 1, "project_name": "Demo"},
                    "comment": {"comment": "hi"}
                }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["sent"], 0);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_notify_unknown_project_is_404() {
    let (state, _) = build_test_state(test_store());
    let app = create_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/notifications/projects/99",
            serde_json::json!({"event": "task.update", "data": {}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_payload_field_is_400() {
    let (state, transport) = build_test_state(test_store());
    let app = create_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/notifications/users/7",
            serde_json::json!({
                "event": "subtask.update",
                "data": {
                    "task": {"id": 42, "title": "Fix bug", "project_id": 1, "project_name": "Demo"}
                }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("subtask"));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_unclassified_event_sends_header_only_message() {
    let (state, transport) = build_test_state(test_store());
    let app = create_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/notifications/users/7",
            serde_json::json!({
                "event": "task.close",
                "data": {
                    "task": {
                        "id": 42,
                        "title": "Fix bug",
                        "project_id": 1,
                        "project_name": "Demo",
                        "description": "not rendered"
                    }
                }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["sent"], 1);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let text = sent[0].body["text"].as_str().unwrap();
    assert!(text.starts_with("**[Demo]**\nTask #42 changed (task.close)\n📝 <"));
    assert!(text.ends_with("|Fix bug>"));
    assert_eq!(text.lines().count(), 3);
}

#[tokio::test]
async fn test_task_without_title_is_400() {
    let (state, transport) = build_test_state(test_store());
    let app = create_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/notifications/users/7",
            serde_json::json!({
                "event": "task.update",
                "data": {
                    "task": {"id": 42, "project_id": 1, "project_name": "Demo"}
                }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(transport.sent().is_empty());
}

// ============================================================
// Integration settings
// ============================================================

#[tokio::test]
async fn test_project_settings_round_trip() {
    let (state, transport) = build_test_state(test_store());

    let app = create_router(state.clone());
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/projects/1/integrations/slack",
            serde_json::json!({
                "slack_webhook_url": "https://hooks.slack.com/services/T/B/project",
                "slack_webhook_channel": "#dev",
                "slack_webhook_mention_id": ""
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let app = create_router(state.clone());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/projects/1/integrations/slack")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["slack_webhook_url"],
        "https://hooks.slack.com/services/T/B/project"
    );
    assert_eq!(json["slack_webhook_channel"], "#dev");
    assert_eq!(json["slack_webhook_mention_id"], "");
    assert!(json["help_url"].as_str().unwrap().contains("plugin-slack"));

    // The saved settings are used for the next project notification.
    let app = create_router(state);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/notifications/projects/1",
            serde_json::json!({
                "event": "task.update",
                "data": {
                    "task": {
                        "id": 5,
                        "title": "Docs",
                        "project_id": 1,
                        "project_name": "Demo",
                        "description": "<b>hi</b>"
                    }
                }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body["channel"], "#dev");
    let text = sent[0].body["text"].as_str().unwrap();
    assert!(text.contains("&lt;b&gt;hi&lt;/b&gt;"));
    assert!(!text.contains("<b>"));
}

#[tokio::test]
async fn test_project_settings_unknown_project() {
    let (state, _) = build_test_state(test_store());
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/projects/42/integrations/slack")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_settings_reject_bad_url() {
    let (state, _) = build_test_state(test_store());
    let app = create_router(state);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/users/7/integrations/slack",
            serde_json::json!({"slack_webhook_url": "hooks.slack.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
