//! Column and completed-list projection.
//!
//! # Invariants
//! - Columns follow project order; hidden columns carry no tasks.
//! - Tasks referencing an unknown project appear in no column.
//! - The completed list is ordered by `completed_at` descending.

use crate::model::board::BoardState;
use crate::model::project::{css_class_for, fallback_color};
use crate::model::task::Task;
use chrono::{DateTime, Utc};

/// One project column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectColumn {
    pub name: String,
    pub css_class: String,
    /// Stored color, or a stable name-derived color when none is stored.
    pub color: String,
    pub hidden: bool,
    /// Counter shown in the column header.
    pub active_count: usize,
    /// Active tasks by priority. Empty for hidden columns.
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub columns: Vec<ProjectColumn>,
    /// Completed tasks, newest first.
    pub completed: Vec<Task>,
    pub completed_count: usize,
    pub show_completed: bool,
    pub dark_mode: bool,
    /// Choices for the new-task project selector.
    pub project_options: Vec<String>,
}

impl BoardView {
    pub fn column(&self, name: &str) -> Option<&ProjectColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Color for a task badge; unknown projects get the fallback color.
    pub fn color_of(&self, project: &str) -> String {
        self.column(project)
            .map(|column| column.color.clone())
            .unwrap_or_else(|| fallback_color(project))
    }
}

/// Builds the view for `state`.
pub fn project_board(state: &BoardState, show_completed: bool) -> BoardView {
    let columns = state
        .projects
        .iter()
        .map(|name| {
            let hidden = state.is_hidden(name);
            let tasks = if hidden {
                Vec::new()
            } else {
                state.active_tasks(name).into_iter().cloned().collect()
            };
            ProjectColumn {
                name: name.clone(),
                css_class: css_class_for(name),
                color: state
                    .project_colors
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| fallback_color(name)),
                hidden,
                active_count: state.active_count(name),
                tasks,
            }
        })
        .collect();

    let completed: Vec<Task> = state.completed_tasks().into_iter().cloned().collect();

    BoardView {
        columns,
        completed_count: completed.len(),
        completed,
        show_completed,
        dark_mode: state.dark_mode,
        project_options: state.projects.clone(),
    }
}

/// Human-readable age of a completion stamp.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        plural(days, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else if minutes > 0 {
        plural(minutes, "minute")
    } else {
        "just now".to_string()
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::relative_time;
    use chrono::{DateTime, Duration};

    #[test]
    fn relative_time_buckets() {
        let now = DateTime::from_timestamp_millis(10_000_000_000).unwrap();
        assert_eq!(relative_time(now, now), "just now");
        assert_eq!(relative_time(now - Duration::seconds(59), now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_time(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(relative_time(now - Duration::days(1), now), "1 day ago");
        assert_eq!(relative_time(now - Duration::days(3), now), "3 days ago");
    }

    #[test]
    fn future_stamps_read_as_just_now() {
        let now = DateTime::from_timestamp_millis(1_000).unwrap();
        assert_eq!(relative_time(now + Duration::hours(1), now), "just now");
    }
}
