use thiserror::Error;

use kb_slack_common::error::AppError;
use kb_slack_common::types::EventKind;

/// Failures while turning one event into one webhook message.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{event} payload is missing required field `{field}`")]
    MissingField {
        event: EventKind,
        field: &'static str,
    },

    #[error("Project {0} not found")]
    ProjectNotFound(i64),

    #[error("Attachment error: {0}")]
    Attachment(String),

    #[error("Attachment I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl NotifyError {
    pub fn missing(event: &EventKind, field: &'static str) -> Self {
        NotifyError::MissingField {
            event: event.clone(),
            field,
        }
    }
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::MissingField { .. } => AppError::Validation(err.to_string()),
            NotifyError::ProjectNotFound(_) => AppError::NotFound(err.to_string()),
            NotifyError::Store(e) => AppError::Database(e),
            NotifyError::Attachment(_) | NotifyError::Io(_) => AppError::Internal(err.to_string()),
        }
    }
}
