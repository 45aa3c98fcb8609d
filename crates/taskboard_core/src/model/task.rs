//! Task record and input validation errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Millisecond-timestamp based task identity.
pub type TaskId = i64;

/// Highest priority a stored task may carry. Slots above this are treated as
/// corrupt so slot arithmetic never reaches `u32::MAX`.
pub const MAX_PRIORITY: u32 = 1 << 24;

/// One to-do entry.
///
/// Serialized with camelCase keys to stay readable by older stored boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Trimmed, never empty.
    pub text: String,
    /// Owning project name.
    pub project: String,
    pub completed: bool,
    /// Set when the task is completed, cleared on reactivation.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Rank among active tasks of `project`. Ignored while completed.
    #[serde(default)]
    pub priority: u32,
}

impl Task {
    /// Creates an active task. Callers validate `text` and `project`.
    pub fn new(id: TaskId, text: impl Into<String>, project: impl Into<String>, priority: u32) -> Self {
        Self {
            id,
            text: text.into(),
            project: project.into(),
            completed: false,
            completed_at: None,
            priority,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Active and owned by `project`.
    pub fn is_active_in(&self, project: &str) -> bool {
        self.is_active() && self.project == project
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(at);
    }

    pub fn reactivate(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    /// Checks the persisted-shape invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id < 0 || self.id == TaskId::MAX {
            return Err(ValidationError::InvalidTaskId(self.id));
        }
        if self.priority > MAX_PRIORITY {
            return Err(ValidationError::PriorityOutOfRange {
                id: self.id,
                priority: self.priority,
            });
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if self.project.trim().is_empty() {
            return Err(ValidationError::EmptyProject);
        }
        if self.completed != self.completed_at.is_some() {
            return Err(ValidationError::CompletionMismatch(self.id));
        }
        Ok(())
    }
}

/// Rejected user input. The board is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task text is blank after trim.
    EmptyText,
    /// No project was selected.
    EmptyProject,
    /// Task references a project that does not exist.
    UnknownProject(String),
    /// Project name is blank, too long or contains control characters.
    InvalidProjectName(String),
    /// Project name is already taken.
    DuplicateProject(String),
    /// Color string is not a recognized CSS color form.
    InvalidColor(String),
    /// `completed` and `completed_at` disagree.
    CompletionMismatch(TaskId),
    /// Stored id is negative or leaves no room for a successor.
    InvalidTaskId(TaskId),
    /// Stored priority is above `MAX_PRIORITY`.
    PriorityOutOfRange { id: TaskId, priority: u32 },
    /// No id greater than the last issued one is left.
    TaskIdsExhausted,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be blank"),
            Self::EmptyProject => write!(f, "a project must be selected"),
            Self::UnknownProject(name) => write!(f, "unknown project: `{name}`"),
            Self::InvalidProjectName(name) => write!(f, "invalid project name: `{name}`"),
            Self::DuplicateProject(name) => write!(f, "project already exists: `{name}`"),
            Self::InvalidColor(color) => write!(f, "invalid color: `{color}`"),
            Self::CompletionMismatch(id) => {
                write!(f, "task {id} completion flag and timestamp disagree")
            }
            Self::InvalidTaskId(id) => write!(f, "task id {id} is out of range"),
            Self::PriorityOutOfRange { id, priority } => {
                write!(f, "task {id} priority {priority} exceeds {MAX_PRIORITY}")
            }
            Self::TaskIdsExhausted => write!(f, "no task ids left"),
        }
    }
}

impl Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::{Task, ValidationError, MAX_PRIORITY};
    use chrono::DateTime;

    #[test]
    fn complete_and_reactivate_keep_timestamp_in_sync() {
        let mut task = Task::new(1, "Buy milk", "Work", 0);
        let at = DateTime::from_timestamp_millis(42).unwrap();

        task.complete(at);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(at));
        assert!(task.validate().is_ok());

        task.reactivate();
        assert!(task.is_active_in("Work"));
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn validate_rejects_blank_text_and_mismatch() {
        let blank = Task::new(1, "  ", "Work", 0);
        assert_eq!(blank.validate(), Err(ValidationError::EmptyText));

        let mut mismatch = Task::new(2, "x", "Work", 0);
        mismatch.completed = true;
        assert_eq!(mismatch.validate(), Err(ValidationError::CompletionMismatch(2)));
    }

    #[test]
    fn validate_rejects_ids_and_priorities_out_of_range() {
        let last = Task::new(i64::MAX, "x", "Work", 0);
        assert_eq!(last.validate(), Err(ValidationError::InvalidTaskId(i64::MAX)));
        assert!(Task::new(-1, "x", "Work", 0).validate().is_err());

        let far = Task::new(3, "x", "Work", u32::MAX);
        assert_eq!(
            far.validate(),
            Err(ValidationError::PriorityOutOfRange {
                id: 3,
                priority: u32::MAX
            })
        );
        assert!(Task::new(4, "x", "Work", MAX_PRIORITY).validate().is_ok());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let task = Task::new(7, "Write report", "Work", 3);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["completedAt"], serde_json::Value::Null);
        assert_eq!(json["priority"], 3);
    }
}
