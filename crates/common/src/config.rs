use std::path::PathBuf;

use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Kanboard PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Address the API server binds to (default: 0.0.0.0:3000)
    pub listen_addr: String,

    /// Webhook used when a user or project has no URL of its own
    pub default_webhook_url: String,

    /// Kanboard base URL; empty disables task links
    pub application_url: String,

    /// Copy task attachments to the staging directory and forward them
    pub forward_attachments: bool,

    /// Root of Kanboard's stored task files
    pub files_dir: PathBuf,

    /// Where forwarded attachments are staged
    pub staging_dir: PathBuf,
}

/// Snapshot of the settings the notifier reads during one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifierConfig {
    pub default_webhook_url: String,
    pub application_url: String,
    pub forward_attachments: bool,
    pub files_dir: PathBuf,
    pub staging_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            default_webhook_url: std::env::var("SLACK_WEBHOOK_URL").unwrap_or_default(),
            application_url: std::env::var("KANBOARD_APPLICATION_URL").unwrap_or_default(),
            forward_attachments: parse_flag(
                "SLACK_FORWARD_ATTACHMENTS",
                std::env::var("SLACK_FORWARD_ATTACHMENTS").ok(),
            )?,
            files_dir: std::env::var("KANBOARD_FILES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/files")),
            staging_dir: std::env::var("SLACK_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_staging_dir()),
        })
    }

    pub fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig {
            default_webhook_url: self.default_webhook_url.clone(),
            application_url: self.application_url.clone(),
            forward_attachments: self.forward_attachments,
            files_dir: self.files_dir.clone(),
            staging_dir: self.staging_dir.clone(),
        }
    }
}

pub fn default_staging_dir() -> PathBuf {
    std::env::temp_dir().join("kanboard_slack")
}

/// Unset means disabled; anything else must be a recognisable boolean.
fn parse_flag(name: &str, value: Option<String>) -> anyhow::Result<bool> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" || v.eq_ignore_ascii_case("yes") => {
            Ok(true)
        }
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" || v.eq_ignore_ascii_case("no") => {
            Ok(false)
        }
        Some(_) => Err(anyhow::anyhow!("{} must be true or false", name)),
    }
}
