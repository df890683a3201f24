//! Event ingest routes.
//!
//! Kanboard posts each event once per recipient. Bodies are decoded with
//! invalid UTF-8 dropped before JSON parsing, so a stray byte in a comment
//! cannot reject the whole event.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use kb_slack_common::error::AppError;
use kb_slack_common::types::{EventKind, EventPayload};
use kb_slack_notifier::ActorContext;
use kb_slack_notifier::escape::decode_lossy;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications/users/{user_id}", post(notify_user))
        .route(
            "/api/notifications/projects/{project_id}",
            post(notify_project),
        )
}

/// Request body for both ingest routes.
#[derive(Debug, Deserialize)]
pub struct NotificationRequest {
    pub event: EventKind,
    #[serde(default)]
    pub data: EventPayload,
    /// Display name of the user who triggered the event, if any.
    #[serde(default)]
    pub actor: Option<String>,
}

impl NotificationRequest {
    fn parse(body: &[u8]) -> Result<Self, AppError> {
        serde_json::from_str(&decode_lossy(body))
            .map_err(|e| AppError::Validation(format!("Invalid notification body: {}", e)))
    }

    fn actor(&self) -> ActorContext {
        ActorContext {
            display_name: self.actor.clone(),
        }
    }
}

/// POST /api/notifications/users/:user_id: notify a user through their webhook.
async fn notify_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let request = NotificationRequest::parse(&body)?;
    let sent = state
        .notifier
        .notify_user(user_id, &request.event, &request.data, &request.actor())
        .await?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "sent": sent }))))
}

/// POST /api/notifications/projects/:project_id: notify a project channel.
async fn notify_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let request = NotificationRequest::parse(&body)?;
    let project = state
        .store()
        .project_by_id(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", project_id)))?;

    let sent = state
        .notifier
        .notify_project(&project, &request.event, &request.data, &request.actor())
        .await?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "sent": sent }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_invalid_utf8() {
        let mut body = br#"{"event":"comment.create","data":{"comment":{"comment":"ok"#.to_vec();
        body.push(0xff);
        body.extend_from_slice(br#"!"}}}"#);

        let request = NotificationRequest::parse(&body).unwrap();
        assert_eq!(request.event, EventKind::CommentCreate);
        assert_eq!(request.data.comment.unwrap().comment, "ok!");
    }

    #[test]
    fn test_parse_keeps_unclassified_event() {
        let request = NotificationRequest::parse(br#"{"event":"task.assignee_change"}"#).unwrap();
        assert_eq!(
            request.event,
            EventKind::Other("task.assignee_change".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_missing_event() {
        let err = NotificationRequest::parse(br#"{"data":{}}"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_parse_rejects_task_without_title() {
        let err = NotificationRequest::parse(
            br#"{"event":"task.update","data":{"task":{"id":42,"project_id":1,"project_name":"Demo"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
