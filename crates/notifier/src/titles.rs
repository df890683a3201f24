//! Title line of a notification.
//!
//! Wording follows the titles Kanboard uses for its own e-mail and web
//! notifications, in an author-attributed and an anonymous variant.

use kb_slack_common::types::{EventKind, EventPayload, Task};

/// Produces the title line for an event.
pub trait TitleFormatter: Send + Sync {
    /// `author` arrives already formatted (bolded) by the renderer.
    fn with_author(&self, author: &str, kind: &EventKind, task: &Task, payload: &EventPayload)
    -> String;

    fn without_author(&self, kind: &EventKind, task: &Task, payload: &EventPayload) -> String;
}

/// English Kanboard notification titles.
#[derive(Debug, Clone, Copy, Default)]
pub struct KanboardTitles;

impl TitleFormatter for KanboardTitles {
    fn with_author(
        &self,
        author: &str,
        kind: &EventKind,
        task: &Task,
        _payload: &EventPayload,
    ) -> String {
        let id = task.id;
        match kind {
            EventKind::TaskCreate => format!("{} created the task #{}", author, id),
            EventKind::TaskUpdate => format!("{} updated the task #{}", author, id),
            EventKind::TaskUserMention => format!("{} mentioned you in the task #{}", author, id),
            EventKind::SubtaskCreate => {
                format!("{} created a subtask for the task #{}", author, id)
            }
            EventKind::SubtaskUpdate => {
                format!("{} updated a subtask for the task #{}", author, id)
            }
            EventKind::SubtaskDelete => {
                format!("{} removed a subtask for the task #{}", author, id)
            }
            EventKind::CommentCreate => format!("{} commented on the task #{}", author, id),
            EventKind::CommentUpdate => {
                format!("{} updated a comment on the task #{}", author, id)
            }
            EventKind::CommentDelete => {
                format!("{} removed a comment on the task #{}", author, id)
            }
            EventKind::CommentUserMention => {
                format!("{} mentioned you in a comment on the task #{}", author, id)
            }
            EventKind::FileCreate => format!("{} attached a file to the task #{}", author, id),
            // Raised by the scheduler, so there is nobody to attribute it to.
            EventKind::TaskOverdue => format!("Task #{} is overdue", id),
            EventKind::Other(name) => format!("{} changed the task #{} ({})", author, id, name),
        }
    }

    fn without_author(&self, kind: &EventKind, task: &Task, payload: &EventPayload) -> String {
        let id = task.id;
        match kind {
            EventKind::TaskCreate => format!("New task #{}: {}", id, task.title),
            EventKind::TaskUpdate => format!("Task updated #{}", id),
            EventKind::TaskUserMention => format!("You were mentioned in the task #{}", id),
            EventKind::SubtaskCreate => format!("New subtask on task #{}", id),
            EventKind::SubtaskUpdate => format!("Subtask updated on task #{}", id),
            EventKind::SubtaskDelete => format!("Subtask removed on task #{}", id),
            EventKind::CommentCreate => format!("New comment on task #{}", id),
            EventKind::CommentUpdate => format!("Comment updated on task #{}", id),
            EventKind::CommentDelete => format!("Comment removed on task #{}", id),
            EventKind::CommentUserMention => {
                format!("You were mentioned in a comment on the task #{}", id)
            }
            EventKind::FileCreate => match &payload.file {
                Some(file) => format!("New attachment on task #{}: {}", id, file.name),
                None => format!("New attachment on task #{}", id),
            },
            EventKind::TaskOverdue => format!("Task #{} is overdue", id),
            EventKind::Other(name) => format!("Task #{} changed ({})", id, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_slack_common::types::TaskFile;

    fn make_task() -> Task {
        Task {
            id: 42,
            title: "Fix bug".to_string(),
            project_id: 1,
            project_name: Some("Demo".to_string()),
            description: None,
        }
    }

    #[test]
    fn test_with_author_embeds_author_and_task_id() {
        let title = KanboardTitles.with_author(
            "**Alice**",
            &EventKind::CommentCreate,
            &make_task(),
            &EventPayload::default(),
        );
        assert_eq!(title, "**Alice** commented on the task #42");
    }

    #[test]
    fn test_without_author_new_task_includes_title() {
        let title =
            KanboardTitles.without_author(&EventKind::TaskCreate, &make_task(), &EventPayload::default());
        assert_eq!(title, "New task #42: Fix bug");
    }

    #[test]
    fn test_without_author_attachment_names_file() {
        let payload = EventPayload {
            file: Some(TaskFile {
                id: 5,
                name: "screenshot.png".to_string(),
                path: "1/42/abc".to_string(),
            }),
            ..Default::default()
        };
        let title = KanboardTitles.without_author(&EventKind::FileCreate, &make_task(), &payload);
        assert_eq!(title, "New attachment on task #42: screenshot.png");
    }

    #[test]
    fn test_every_kind_has_a_title() {
        let task = make_task();
        let payload = EventPayload::default();
        let other = EventKind::Other("task.move.column".to_string());
        for kind in EventKind::ALL.iter().chain([&other]) {
            assert!(
                KanboardTitles
                    .with_author("**A**", kind, &task, &payload)
                    .contains("#42")
            );
            assert!(KanboardTitles.without_author(kind, &task, &payload).contains("#42"));
        }
    }

    #[test]
    fn test_unclassified_event_title_names_the_event() {
        let kind = EventKind::Other("task.close".to_string());
        let payload = EventPayload::default();
        assert_eq!(
            KanboardTitles.with_author("**Alice**", &kind, &make_task(), &payload),
            "**Alice** changed the task #42 (task.close)"
        );
        assert_eq!(
            KanboardTitles.without_author(&kind, &make_task(), &payload),
            "Task #42 changed (task.close)"
        );
    }
}
