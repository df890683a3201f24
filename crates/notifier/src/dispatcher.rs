//! Notification dispatcher.
//!
//! For each incoming event:
//! 1. Resolve the destination for the user or project
//! 2. Skip quietly when no webhook URL is configured
//! 3. Render the message (one per task for overdue digests)
//! 4. Add the channel override and hand the message to the transport

use std::sync::Arc;

use kb_slack_common::config::NotifierConfig;
use kb_slack_common::types::{Destination, EventKind, EventPayload, Project};

use crate::destination::{DestinationResolver, Target};
use crate::error::NotifyError;
use crate::renderer::{ActorContext, MessageRenderer};
use crate::store::KanboardStore;
use crate::titles::{KanboardTitles, TitleFormatter};
use crate::transport::Transport;

/// Entry point for user- and project-level notifications.
pub struct Notifier {
    store: Arc<dyn KanboardStore>,
    transport: Arc<dyn Transport>,
    titles: Arc<dyn TitleFormatter>,
    config: NotifierConfig,
}

impl Notifier {
    pub fn new(
        store: Arc<dyn KanboardStore>,
        transport: Arc<dyn Transport>,
        config: NotifierConfig,
    ) -> Self {
        Self {
            store,
            transport,
            titles: Arc::new(KanboardTitles),
            config,
        }
    }

    pub fn with_titles(mut self, titles: Arc<dyn TitleFormatter>) -> Self {
        self.titles = titles;
        self
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn KanboardStore> {
        &self.store
    }

    /// Notify a user. Returns the number of messages submitted.
    ///
    /// Overdue digests fan out into one message per task, in payload order.
    /// A task that fails to render is logged and skipped; the rest still go out.
    pub async fn notify_user(
        &self,
        user_id: i64,
        kind: &EventKind,
        payload: &EventPayload,
        actor: &ActorContext,
    ) -> Result<u32, NotifyError> {
        let destination = self.resolve(Target::User(user_id)).await;
        if !destination.is_deliverable() {
            tracing::debug!(user_id, event = %kind, "No webhook configured for user");
            return Ok(0);
        }

        if kind.is_digest() {
            let tasks = payload
                .tasks
                .as_deref()
                .ok_or_else(|| NotifyError::missing(kind, "tasks"))?;
            let base = EventPayload {
                tasks: None,
                ..payload.clone()
            };

            let mut sent = 0u32;
            for task in tasks {
                let item = EventPayload {
                    task: Some(task.clone()),
                    ..base.clone()
                };
                let result = match self.project(task.project_id).await {
                    Ok(project) => self.send(&destination, &project, kind, &item, actor).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(()) => sent += 1,
                    Err(e) => {
                        tracing::warn!(
                            user_id,
                            task_id = task.id,
                            event = %kind,
                            error = %e,
                            "Skipping digest item"
                        );
                    }
                }
            }
            return Ok(sent);
        }

        let task = payload
            .task
            .as_ref()
            .ok_or_else(|| NotifyError::missing(kind, "task"))?;
        let project = self.project(task.project_id).await?;
        self.send(&destination, &project, kind, payload, actor)
            .await?;
        Ok(1)
    }

    /// Notify a project channel. Never fans out; sends at most one message.
    pub async fn notify_project(
        &self,
        project: &Project,
        kind: &EventKind,
        payload: &EventPayload,
        actor: &ActorContext,
    ) -> Result<u32, NotifyError> {
        let destination = self.resolve(Target::Project(project.id)).await;
        if !destination.is_deliverable() {
            tracing::debug!(project_id = project.id, event = %kind, "No webhook configured for project");
            return Ok(0);
        }

        self.send(&destination, project, kind, payload, actor)
            .await?;
        Ok(1)
    }

    async fn resolve(&self, target: Target) -> Destination {
        DestinationResolver::new(self.store.as_ref(), &self.config)
            .resolve(target)
            .await
    }

    async fn project(&self, project_id: i64) -> Result<Project, NotifyError> {
        self.store
            .project_by_id(project_id)
            .await?
            .ok_or(NotifyError::ProjectNotFound(project_id))
    }

    async fn send(
        &self,
        destination: &Destination,
        project: &Project,
        kind: &EventKind,
        payload: &EventPayload,
        actor: &ActorContext,
    ) -> Result<(), NotifyError> {
        let renderer = MessageRenderer::new(&self.config, self.titles.as_ref());
        let mut message = renderer.render(project, kind, payload, actor).await?;

        if let Some(channel) = &destination.channel {
            message.channel = Some(channel.clone());
        }

        tracing::debug!(
            project_id = project.id,
            event = %kind,
            "Rendered notification"
        );
        self.transport
            .post_async(&destination.webhook_url, message);
        Ok(())
    }
}
