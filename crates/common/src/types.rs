use serde::{Deserialize, Serialize};

/// Metadata key holding a per-user, per-project or global webhook URL.
pub const SETTING_WEBHOOK_URL: &str = "slack_webhook_url";

/// Metadata key holding a per-user or per-project channel override.
pub const SETTING_WEBHOOK_CHANNEL: &str = "slack_webhook_channel";

/// Metadata key holding the mention id collected by the integration form.
pub const SETTING_WEBHOOK_MENTION_ID: &str = "slack_webhook_mention_id";

/// Bot display name sent with every message.
pub const BOT_USERNAME: &str = "Kanboard";

/// Branding icon sent with every message.
pub const BOT_ICON_URL: &str =
    "https://raw.githubusercontent.com/kanboard/kanboard/master/assets/img/favicon.png";

/// Kanboard events this adapter can turn into chat messages.
///
/// Events outside the classified set (`task.close`, `task.move.column`, ...)
/// are kept as [`EventKind::Other`] and rendered without a detail block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    TaskCreate,
    TaskUpdate,
    TaskUserMention,
    SubtaskCreate,
    SubtaskUpdate,
    SubtaskDelete,
    CommentCreate,
    CommentUpdate,
    CommentDelete,
    CommentUserMention,
    FileCreate,
    TaskOverdue,
    Other(String),
}

/// Which kind-specific line a message gets below its header.
///
/// Every event kind maps to exactly one variant, so a message can never carry
/// two detail blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailBlock {
    Subtask,
    Description,
    Comment,
    Attachment,
    None,
}

impl EventKind {
    /// Every classified kind.
    pub const ALL: [EventKind; 12] = [
        EventKind::TaskCreate,
        EventKind::TaskUpdate,
        EventKind::TaskUserMention,
        EventKind::SubtaskCreate,
        EventKind::SubtaskUpdate,
        EventKind::SubtaskDelete,
        EventKind::CommentCreate,
        EventKind::CommentUpdate,
        EventKind::CommentDelete,
        EventKind::CommentUserMention,
        EventKind::FileCreate,
        EventKind::TaskOverdue,
    ];

    /// Wire name, as raised by Kanboard.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::TaskCreate => "task.create",
            EventKind::TaskUpdate => "task.update",
            EventKind::TaskUserMention => "task.user.mention",
            EventKind::SubtaskCreate => "subtask.create",
            EventKind::SubtaskUpdate => "subtask.update",
            EventKind::SubtaskDelete => "subtask.delete",
            EventKind::CommentCreate => "comment.create",
            EventKind::CommentUpdate => "comment.update",
            EventKind::CommentDelete => "comment.delete",
            EventKind::CommentUserMention => "comment.user.mention",
            EventKind::FileCreate => "task.file.create",
            EventKind::TaskOverdue => "task.overdue",
            EventKind::Other(name) => name,
        }
    }

    pub fn detail_block(&self) -> DetailBlock {
        match self {
            EventKind::SubtaskCreate | EventKind::SubtaskUpdate | EventKind::SubtaskDelete => {
                DetailBlock::Subtask
            }
            EventKind::TaskCreate | EventKind::TaskUpdate | EventKind::TaskUserMention => {
                DetailBlock::Description
            }
            EventKind::CommentCreate
            | EventKind::CommentUpdate
            | EventKind::CommentDelete
            | EventKind::CommentUserMention => DetailBlock::Comment,
            EventKind::FileCreate => DetailBlock::Attachment,
            EventKind::TaskOverdue | EventKind::Other(_) => DetailBlock::None,
        }
    }

    /// Digest events carry a task list and fan out to one message per task.
    pub fn is_digest(&self) -> bool {
        matches!(self, EventKind::TaskOverdue)
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "task.create" => EventKind::TaskCreate,
            "task.update" => EventKind::TaskUpdate,
            "task.user.mention" => EventKind::TaskUserMention,
            "subtask.create" => EventKind::SubtaskCreate,
            "subtask.update" => EventKind::SubtaskUpdate,
            "subtask.delete" => EventKind::SubtaskDelete,
            "comment.create" => EventKind::CommentCreate,
            "comment.update" => EventKind::CommentUpdate,
            "comment.delete" => EventKind::CommentDelete,
            "comment.user.mention" => EventKind::CommentUserMention,
            "task.file.create" => EventKind::FileCreate,
            "task.overdue" => EventKind::TaskOverdue,
            _ => EventKind::Other(name),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Subtask progress, encoded on the wire as Kanboard's integer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum SubtaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TryFrom<i64> for SubtaskStatus {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SubtaskStatus::Todo),
            1 => Ok(SubtaskStatus::InProgress),
            2 => Ok(SubtaskStatus::Done),
            other => Err(format!("unknown subtask status {}", other)),
        }
    }
}

impl From<SubtaskStatus> for i64 {
    fn from(status: SubtaskStatus) -> Self {
        match status {
            SubtaskStatus::Todo => 0,
            SubtaskStatus::InProgress => 1,
            SubtaskStatus::Done => 2,
        }
    }
}

/// A Kanboard task as carried in event payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub project_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Kanboard sends `null` for tasks that never had a description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Task {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub status: SubtaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: i64,
    pub comment: String,
}

/// A file attached to a task. `path` is relative to the Kanboard files directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFile {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub path: String,
}

/// Event data as raised by Kanboard.
///
/// Which fields are present depends on the event kind; the renderer checks
/// for the ones its kind requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtask: Option<Subtask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<TaskFile>,
    /// Set by project-wide events; takes precedence over the task's project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

/// A Kanboard project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

/// Slack integration values stored for a user or a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    /// Collected by the integration form; not used when rendering messages.
    #[serde(default)]
    pub mention_id: Option<String>,
}

/// Where a message goes: webhook URL plus an optional channel override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destination {
    pub webhook_url: String,
    pub channel: Option<String>,
}

impl Destination {
    /// A destination without a URL means "do not send".
    pub fn is_deliverable(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }
}

/// JSON body posted to the incoming webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub text: String,
    pub username: String,
    pub icon_url: String,
    /// Staged attachment path, or an empty string.
    pub attachments: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}
