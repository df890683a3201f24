//! Message renderer: turns one event into one webhook message.
//!
//! Layout:
//! 1. `**[<project>]**` header line
//! 2. title line (author-attributed when an actor is known)
//! 3. task reference, linked when an application URL is configured
//! 4. at most one detail block chosen by [`EventKind::detail_block`]
//!
//! Every user-controlled string is escaped with [`escape_html`].

use kb_slack_common::config::NotifierConfig;
use kb_slack_common::types::{
    BOT_ICON_URL, BOT_USERNAME, DetailBlock, EventKind, EventPayload, Project, SubtaskStatus,
    WebhookMessage,
};

use crate::attachment::stage_attachment;
use crate::error::NotifyError;
use crate::escape::escape_html;
use crate::links::LinkBuilder;
use crate::titles::TitleFormatter;

/// Who triggered the event, if anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorContext {
    pub display_name: Option<String>,
}

impl ActorContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
        }
    }

    fn name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

pub struct MessageRenderer<'a> {
    config: &'a NotifierConfig,
    titles: &'a dyn TitleFormatter,
}

impl<'a> MessageRenderer<'a> {
    pub fn new(config: &'a NotifierConfig, titles: &'a dyn TitleFormatter) -> Self {
        Self { config, titles }
    }

    /// Render the full webhook message, staging the attachment when the
    /// event carries one and forwarding is enabled.
    pub async fn render(
        &self,
        project: &Project,
        kind: &EventKind,
        payload: &EventPayload,
        actor: &ActorContext,
    ) -> Result<WebhookMessage, NotifyError> {
        let text = self.compose_text(project, kind, payload, actor)?;

        let attachments = if kind.detail_block() == DetailBlock::Attachment
            && self.config.forward_attachments
        {
            let file = payload
                .file
                .as_ref()
                .ok_or_else(|| NotifyError::missing(kind, "file"))?;
            stage_attachment(self.config, file)
                .await?
                .to_string_lossy()
                .into_owned()
        } else {
            String::new()
        };

        Ok(WebhookMessage {
            text,
            username: BOT_USERNAME.to_string(),
            icon_url: BOT_ICON_URL.to_string(),
            attachments,
            channel: None,
        })
    }

    /// Build the message text. Pure: no I/O.
    pub fn compose_text(
        &self,
        project: &Project,
        kind: &EventKind,
        payload: &EventPayload,
        actor: &ActorContext,
    ) -> Result<String, NotifyError> {
        let task = payload
            .task
            .as_ref()
            .ok_or_else(|| NotifyError::missing(kind, "task"))?;
        if task.title.trim().is_empty() {
            return Err(NotifyError::missing(kind, "task.title"));
        }

        let title = match actor.name() {
            Some(name) => {
                let author = format!("**{}**", name);
                self.titles.with_author(&author, kind, task, payload)
            }
            None => self.titles.without_author(kind, task, payload),
        };

        let project_name = match (&payload.project_name, &task.project_name) {
            (Some(name), _) | (None, Some(name)) => name.as_str(),
            (None, None) => return Err(NotifyError::missing(kind, "task.project_name")),
        };

        let mut message = format!(
            "**[{}]**\n{}\n",
            escape_html(project_name),
            escape_html(&title)
        );

        let links = LinkBuilder::new(&self.config.application_url);
        if links.is_enabled() {
            message.push_str(&format!(
                "📝 <{}|{}>",
                links.task_view_url(task.id, project.id),
                escape_html(&task.title)
            ));
        } else {
            message.push_str(&escape_html(&task.title));
        }

        match kind.detail_block() {
            DetailBlock::Subtask => {
                let subtask = payload
                    .subtask
                    .as_ref()
                    .ok_or_else(|| NotifyError::missing(kind, "subtask"))?;
                message.push_str(&format!(
                    "\n**  ↳ {}** *\"{}\"*",
                    status_glyph(subtask.status),
                    escape_html(&subtask.title)
                ));
            }
            DetailBlock::Description => {
                if !task.description().is_empty() {
                    message.push_str(&format!(
                        "\n✏️ *\"{}\"*",
                        escape_html(task.description())
                    ));
                }
            }
            DetailBlock::Comment => {
                let comment = payload
                    .comment
                    .as_ref()
                    .ok_or_else(|| NotifyError::missing(kind, "comment"))?;
                message.push_str(&format!("\n💬 *\"{}\"*", escape_html(&comment.comment)));
            }
            // Attachments travel in the `attachments` field, not in the text.
            DetailBlock::Attachment | DetailBlock::None => {}
        }

        Ok(message)
    }
}

fn status_glyph(status: SubtaskStatus) -> &'static str {
    match status {
        SubtaskStatus::Done => "❌ ",
        SubtaskStatus::InProgress => "🕘 ",
        SubtaskStatus::Todo => "",
    }
}
