//! Attachment staging for `task.file.create` events.
//!
//! The stored file is copied out of Kanboard's files directory into a shared
//! staging directory so the webhook payload can reference it by path.

use std::path::{Component, Path, PathBuf};

use kb_slack_common::config::NotifierConfig;
use kb_slack_common::types::TaskFile;

use crate::error::NotifyError;

/// Make a user-supplied file name safe to use as a single path segment.
///
/// Spaces become `-`; anything outside `[A-Za-z0-9._-]` is dropped, as are
/// leading dots.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            _ => None,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Copy `file` into the staging directory and return the staged path.
pub async fn stage_attachment(
    config: &NotifierConfig,
    file: &TaskFile,
) -> Result<PathBuf, NotifyError> {
    let source = stored_path(&config.files_dir, &file.path)?;

    // Concurrent dispatches may race here; create_dir_all accepts an existing dir.
    tokio::fs::create_dir_all(&config.staging_dir).await?;

    let staged = config.staging_dir.join(sanitize_file_name(&file.name));
    tokio::fs::copy(&source, &staged).await.map_err(|e| {
        NotifyError::Attachment(format!("cannot copy {}: {}", source.display(), e))
    })?;

    tracing::debug!(
        file_id = file.id,
        staged = %staged.display(),
        "Attachment staged"
    );
    Ok(staged)
}

/// Resolve a stored path, refusing anything that could leave `files_dir`.
fn stored_path(files_dir: &Path, relative: &str) -> Result<PathBuf, NotifyError> {
    let relative = Path::new(relative);
    let escapes = relative.as_os_str().is_empty()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes {
        return Err(NotifyError::Attachment(format!(
            "refusing stored file path {}",
            relative.display()
        )));
    }
    Ok(files_dir.join(relative))
}
