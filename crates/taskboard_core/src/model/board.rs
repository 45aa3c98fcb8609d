//! Owned board state.
//!
//! Projects, colors and the hidden set are separate collections keyed by
//! project name; nothing cross-validates them.

use crate::model::task::{Task, TaskId};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardState {
    /// Collection order is irrelevant for display; `priority` decides.
    pub tasks: Vec<Task>,
    /// Project names in column order.
    pub projects: Vec<String>,
    pub hidden_projects: BTreeSet<String>,
    pub project_colors: BTreeMap<String, String>,
    pub dark_mode: bool,
}

impl BoardState {
    /// Empty board with the given project columns.
    pub fn with_projects<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projects: projects.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn has_project(&self, name: &str) -> bool {
        self.projects.iter().any(|project| project == name)
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden_projects.contains(name)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    /// Active tasks of `project`, sorted by priority. Ties keep collection
    /// order.
    pub fn active_tasks(&self, project: &str) -> Vec<&Task> {
        let mut active: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.is_active_in(project))
            .collect();
        active.sort_by_key(|task| task.priority);
        active
    }

    pub fn active_count(&self, project: &str) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.is_active_in(project))
            .count()
    }

    /// Total active tasks across all projects.
    pub fn total_active(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_active()).count()
    }

    /// Completed tasks, most recently completed first.
    pub fn completed_tasks(&self) -> Vec<&Task> {
        let mut completed: Vec<&Task> = self.tasks.iter().filter(|task| task.completed).collect();
        completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        completed
    }
}
