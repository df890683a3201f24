//! Health check endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.notifier.config();
    Json(json!({
        "status": "ok",
        "service": "kb-slack-api",
        "version": env!("CARGO_PKG_VERSION"),
        "default_webhook": !config.default_webhook_url.is_empty(),
        "forward_attachments": config.forward_attachments,
    }))
}
