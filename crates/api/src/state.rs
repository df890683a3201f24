//! Shared application state for the Axum API server.

use std::sync::Arc;

use kb_slack_notifier::Notifier;
use kb_slack_notifier::store::KanboardStore;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub notifier: Arc<Notifier>,
}

impl AppState {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            notifier: Arc::new(notifier),
        }
    }

    pub fn store(&self) -> &dyn KanboardStore {
        self.notifier.store().as_ref()
    }
}
