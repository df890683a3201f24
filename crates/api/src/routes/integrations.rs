//! Slack integration settings for users and projects.
//!
//! Mirrors the fields of Kanboard's integration form. Field names match the
//! metadata keys they are stored under.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use kb_slack_common::error::AppError;
use kb_slack_common::types::IntegrationSettings;

use crate::state::AppState;

const HELP_URL: &str = "https://github.com/kanboard/plugin-slack#configuration";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/{id}/integrations/slack",
            get(get_user_settings).put(put_user_settings),
        )
        .route(
            "/api/projects/{id}/integrations/slack",
            get(get_project_settings).put(put_project_settings),
        )
}

/// Form values; an empty string clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationForm {
    #[serde(default)]
    pub slack_webhook_url: String,
    #[serde(default)]
    pub slack_webhook_channel: String,
    #[serde(default)]
    pub slack_webhook_mention_id: String,
}

#[derive(Debug, Serialize)]
pub struct IntegrationView {
    #[serde(flatten)]
    pub values: IntegrationForm,
    pub help_url: &'static str,
}

impl From<IntegrationSettings> for IntegrationView {
    fn from(settings: IntegrationSettings) -> Self {
        Self {
            values: IntegrationForm {
                slack_webhook_url: settings.webhook_url.unwrap_or_default(),
                slack_webhook_channel: settings.channel.unwrap_or_default(),
                slack_webhook_mention_id: settings.mention_id.unwrap_or_default(),
            },
            help_url: HELP_URL,
        }
    }
}

impl IntegrationForm {
    fn into_settings(self) -> Result<IntegrationSettings, AppError> {
        let url = self.slack_webhook_url.trim();
        if !url.is_empty() && !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::Validation(
                "slack_webhook_url must be an http(s) URL".to_string(),
            ));
        }

        let opt = |v: String| {
            let v = v.trim().to_string();
            (!v.is_empty()).then_some(v)
        };
        Ok(IntegrationSettings {
            webhook_url: opt(self.slack_webhook_url),
            channel: opt(self.slack_webhook_channel),
            mention_id: opt(self.slack_webhook_mention_id),
        })
    }
}

/// GET /api/users/:id/integrations/slack
async fn get_user_settings(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<IntegrationView>, AppError> {
    let settings = state.store().user_settings(user_id).await?;
    Ok(Json(settings.into()))
}

/// PUT /api/users/:id/integrations/slack
async fn put_user_settings(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(form): Json<IntegrationForm>,
) -> Result<Json<IntegrationView>, AppError> {
    let settings = form.into_settings()?;
    state.store().save_user_settings(user_id, &settings).await?;
    tracing::info!(user_id, "User Slack integration saved");
    Ok(Json(settings.into()))
}

/// GET /api/projects/:id/integrations/slack
async fn get_project_settings(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<IntegrationView>, AppError> {
    ensure_project(&state, project_id).await?;
    let settings = state.store().project_settings(project_id).await?;
    Ok(Json(settings.into()))
}

/// PUT /api/projects/:id/integrations/slack
async fn put_project_settings(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(form): Json<IntegrationForm>,
) -> Result<Json<IntegrationView>, AppError> {
    ensure_project(&state, project_id).await?;
    let settings = form.into_settings()?;
    state
        .store()
        .save_project_settings(project_id, &settings)
        .await?;
    tracing::info!(project_id, "Project Slack integration saved");
    Ok(Json(settings.into()))
}

async fn ensure_project(state: &AppState, project_id: i64) -> Result<(), AppError> {
    match state.store().project_by_id(project_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!(
            "Project {} not found",
            project_id
        ))),
    }
}
