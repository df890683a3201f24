//! Destination resolver.
//!
//! A user's or project's own webhook URL wins; otherwise the process-wide
//! default applies. The channel override never falls back. Resolution never
//! fails: an undeliverable [`Destination`] tells the caller to skip sending.

use kb_slack_common::config::NotifierConfig;
use kb_slack_common::types::{Destination, IntegrationSettings};

use crate::store::KanboardStore;

/// Whose settings to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    User(i64),
    Project(i64),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::User(id) => write!(f, "user:{}", id),
            Target::Project(id) => write!(f, "project:{}", id),
        }
    }
}

pub struct DestinationResolver<'a> {
    store: &'a dyn KanboardStore,
    config: &'a NotifierConfig,
}

impl<'a> DestinationResolver<'a> {
    pub fn new(store: &'a dyn KanboardStore, config: &'a NotifierConfig) -> Self {
        Self { store, config }
    }

    pub async fn resolve(&self, target: Target) -> Destination {
        let settings = match target {
            Target::User(id) => self.store.user_settings(id).await,
            Target::Project(id) => self.store.project_settings(id).await,
        };

        match settings {
            Ok(settings) => {
                if settings.mention_id.is_some() {
                    tracing::debug!(
                        owner = %target,
                        "Mention id is configured but not used in messages"
                    );
                }
                merge(&settings, &self.config.default_webhook_url)
            }
            Err(e) => {
                // Falling back to the default could post to the wrong place.
                tracing::warn!(
                    owner = %target,
                    error = %e,
                    "Could not load integration settings, skipping"
                );
                Destination::default()
            }
        }
    }
}

/// Combine stored settings with the default webhook URL.
pub fn merge(settings: &IntegrationSettings, default_webhook_url: &str) -> Destination {
    let webhook_url = settings
        .webhook_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| default_webhook_url.trim())
        .to_string();

    let channel = settings
        .channel
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Destination {
        webhook_url,
        channel,
    }
}
