//! Access to Kanboard-owned data: integration settings and projects.
//!
//! Kanboard keeps per-user and per-project integration values as name/value
//! rows in `user_has_metadata` and `project_has_metadata`. [`PgStore`] reads
//! and writes those tables directly; [`MemoryStore`] backs tests.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use kb_slack_common::types::{
    IntegrationSettings, Project, SETTING_WEBHOOK_CHANNEL, SETTING_WEBHOOK_MENTION_ID,
    SETTING_WEBHOOK_URL,
};

use crate::error::NotifyError;

#[async_trait]
pub trait KanboardStore: Send + Sync {
    async fn user_settings(&self, user_id: i64) -> Result<IntegrationSettings, NotifyError>;

    async fn project_settings(&self, project_id: i64)
    -> Result<IntegrationSettings, NotifyError>;

    /// Replace the stored values; `None` or empty removes a key.
    async fn save_user_settings(
        &self,
        user_id: i64,
        settings: &IntegrationSettings,
    ) -> Result<(), NotifyError>;

    async fn save_project_settings(
        &self,
        project_id: i64,
        settings: &IntegrationSettings,
    ) -> Result<(), NotifyError>;

    async fn project_by_id(&self, project_id: i64) -> Result<Option<Project>, NotifyError>;
}

/// Empty strings are stored by the Kanboard form and mean "not set".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize(settings: &IntegrationSettings) -> IntegrationSettings {
    IntegrationSettings {
        webhook_url: non_empty(settings.webhook_url.clone()),
        channel: non_empty(settings.channel.clone()),
        mention_id: non_empty(settings.mention_id.clone()),
    }
}

#[derive(Debug, Clone, Copy)]
enum MetadataTable {
    User,
    Project,
}

impl MetadataTable {
    fn table(self) -> &'static str {
        match self {
            MetadataTable::User => "user_has_metadata",
            MetadataTable::Project => "project_has_metadata",
        }
    }

    fn owner_column(self) -> &'static str {
        match self {
            MetadataTable::User => "user_id",
            MetadataTable::Project => "project_id",
        }
    }
}

/// Kanboard PostgreSQL database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(
        &self,
        table: MetadataTable,
        owner_id: i64,
    ) -> Result<IntegrationSettings, NotifyError> {
        let sql = format!(
            "SELECT name, value FROM {} WHERE {} = $1 AND name = ANY($2)",
            table.table(),
            table.owner_column()
        );
        let rows: Vec<(String, Option<String>)> = sqlx::query_as(&sql)
            .bind(owner_id)
            .bind(&[
                SETTING_WEBHOOK_URL,
                SETTING_WEBHOOK_CHANNEL,
                SETTING_WEBHOOK_MENTION_ID,
            ][..])
            .fetch_all(&self.pool)
            .await?;

        let mut settings = IntegrationSettings::default();
        for (name, value) in rows {
            let value = non_empty(value);
            match name.as_str() {
                SETTING_WEBHOOK_URL => settings.webhook_url = value,
                SETTING_WEBHOOK_CHANNEL => settings.channel = value,
                SETTING_WEBHOOK_MENTION_ID => settings.mention_id = value,
                _ => {}
            }
        }
        Ok(settings)
    }

    async fn save(
        &self,
        table: MetadataTable,
        owner_id: i64,
        settings: &IntegrationSettings,
    ) -> Result<(), NotifyError> {
        let settings = normalize(settings);
        let upsert = format!(
            "INSERT INTO {table} ({owner}, name, value, changed_on) \
             VALUES ($1, $2, $3, EXTRACT(EPOCH FROM NOW())::INTEGER) \
             ON CONFLICT ({owner}, name) \
             DO UPDATE SET value = EXCLUDED.value, changed_on = EXCLUDED.changed_on",
            table = table.table(),
            owner = table.owner_column()
        );
        let delete = format!(
            "DELETE FROM {} WHERE {} = $1 AND name = $2",
            table.table(),
            table.owner_column()
        );

        let entries = [
            (SETTING_WEBHOOK_URL, &settings.webhook_url),
            (SETTING_WEBHOOK_CHANNEL, &settings.channel),
            (SETTING_WEBHOOK_MENTION_ID, &settings.mention_id),
        ];

        let mut tx = self.pool.begin().await?;
        for (name, value) in entries {
            match value {
                Some(value) => {
                    sqlx::query(&upsert)
                        .bind(owner_id)
                        .bind(name)
                        .bind(value)
                        .execute(&mut *tx)
                        .await?;
                }
                None => {
                    sqlx::query(&delete)
                        .bind(owner_id)
                        .bind(name)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl KanboardStore for PgStore {
    async fn user_settings(&self, user_id: i64) -> Result<IntegrationSettings, NotifyError> {
        self.load(MetadataTable::User, user_id).await
    }

    async fn project_settings(
        &self,
        project_id: i64,
    ) -> Result<IntegrationSettings, NotifyError> {
        self.load(MetadataTable::Project, project_id).await
    }

    async fn save_user_settings(
        &self,
        user_id: i64,
        settings: &IntegrationSettings,
    ) -> Result<(), NotifyError> {
        self.save(MetadataTable::User, user_id, settings).await
    }

    async fn save_project_settings(
        &self,
        project_id: i64,
        settings: &IntegrationSettings,
    ) -> Result<(), NotifyError> {
        self.save(MetadataTable::Project, project_id, settings).await
    }

    async fn project_by_id(&self, project_id: i64) -> Result<Option<Project>, NotifyError> {
        // Kanboard ids are INTEGER columns.
        let project = sqlx::query_as::<_, Project>(
            "SELECT id::BIGINT AS id, name FROM projects WHERE id = $1",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }
}

/// In-process store for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<i64, IntegrationSettings>>,
    projects: RwLock<HashMap<i64, IntegrationSettings>>,
    project_records: RwLock<HashMap<i64, Project>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_settings(mut self, user_id: i64, settings: IntegrationSettings) -> Self {
        self.users.get_mut().insert(user_id, normalize(&settings));
        self
    }

    pub fn with_project_settings(mut self, project_id: i64, settings: IntegrationSettings) -> Self {
        self.projects
            .get_mut()
            .insert(project_id, normalize(&settings));
        self
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.project_records.get_mut().insert(project.id, project);
        self
    }
}

#[async_trait]
impl KanboardStore for MemoryStore {
    async fn user_settings(&self, user_id: i64) -> Result<IntegrationSettings, NotifyError> {
        Ok(self
            .users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn project_settings(
        &self,
        project_id: i64,
    ) -> Result<IntegrationSettings, NotifyError> {
        Ok(self
            .projects
            .read()
            .await
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_user_settings(
        &self,
        user_id: i64,
        settings: &IntegrationSettings,
    ) -> Result<(), NotifyError> {
        self.users
            .write()
            .await
            .insert(user_id, normalize(settings));
        Ok(())
    }

    async fn save_project_settings(
        &self,
        project_id: i64,
        settings: &IntegrationSettings,
    ) -> Result<(), NotifyError> {
        self.projects
            .write()
            .await
            .insert(project_id, normalize(settings));
        Ok(())
    }

    async fn project_by_id(&self, project_id: i64) -> Result<Option<Project>, NotifyError> {
        Ok(self.project_records.read().await.get(&project_id).cloned())
    }
}
