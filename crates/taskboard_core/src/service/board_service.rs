//! Board use-case service.
//!
//! # Responsibility
//! - Entry point for every interaction: validate, mutate, re-order, persist.
//! - Own the single `BoardState` between an explicit `open` and the saves
//!   that follow each mutation.
//!
//! # Invariants
//! - A mutation is applied to a copy and only becomes visible after the
//!   store accepted it, so in-memory and stored state never diverge.
//! - Validation failures leave state and store untouched.
//! - Unknown task or project references are silent no-ops (`Ok(None)` or
//!   `Ok(false)`).

use crate::clock::{Clock, SystemClock};
use crate::config::{BoardConfig, ConfigError};
use crate::model::board::BoardState;
use crate::model::project::{random_color, validate_color, validate_project_name};
use crate::model::task::{Task, TaskId, ValidationError};
use crate::ordering;
use crate::repo::blob_repo::BlobRepository;
use crate::repo::board_repo::{load_board, save_board, RecoveredKey};
use crate::repo::RepoError;
use crate::view::presentation::PresentationTracker;
use crate::view::projection::{project_board, BoardView};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BoardResult<T> = Result<T, BoardError>;

/// Errors surfaced by board operations.
#[derive(Debug)]
pub enum BoardError {
    /// Input rejected; caller should show feedback.
    Validation(ValidationError),
    /// Store failure; the operation was not applied.
    Repo(RepoError),
    /// Rejected configuration passed to `open`.
    Config(ConfigError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ValidationError> for BoardError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConfigError> for BoardError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RepoError> for BoardError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Task board facade over a blob store.
pub struct BoardService<R: BlobRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    config: BoardConfig,
    state: BoardState,
    last_task_id: TaskId,
    show_completed: bool,
    from_version: u32,
    recovered: Vec<RecoveredKey>,
}

impl<R: BlobRepository> BoardService<R, SystemClock> {
    /// Opens the board with the system clock and default config.
    pub fn open_default(repo: R) -> BoardResult<Self> {
        Self::open(repo, SystemClock, BoardConfig::default())
    }
}

impl<R: BlobRepository, C: Clock> BoardService<R, C> {
    /// Loads the board from `repo`, migrating older layouts in memory.
    ///
    /// The store is not written until the first mutation. `config` is
    /// validated first.
    pub fn open(repo: R, clock: C, config: BoardConfig) -> BoardResult<Self> {
        config.validate()?;
        let outcome = load_board(&repo, &config.default_projects)?;
        let last_task_id = outcome
            .state
            .tasks
            .iter()
            .map(|task| task.id)
            .max()
            .unwrap_or(0);
        Ok(Self {
            repo,
            clock,
            config,
            state: outcome.state,
            last_task_id,
            show_completed: true,
            from_version: outcome.from_version,
            recovered: outcome.recovered,
        })
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.state.task(id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn projects(&self) -> &[String] {
        &self.state.projects
    }

    /// Schema version the board was stored with when opened.
    pub fn loaded_from_version(&self) -> u32 {
        self.from_version
    }

    /// Keys that fell back to defaults during `open`.
    pub fn recovered(&self) -> &[RecoveredKey] {
        &self.recovered
    }

    pub fn show_completed(&self) -> bool {
        self.show_completed
    }

    /// Tracker for follow-up renders, using the configured timeout.
    pub fn presentation_tracker(&self) -> PresentationTracker {
        PresentationTracker::new(self.config.presentation_timeout_ms)
    }

    /// Read-only projection for rendering.
    pub fn view(&self) -> BoardView {
        project_board(&self.state, self.show_completed)
    }

    /// Adds an active task at the end of `project`.
    pub fn add_task(&mut self, text: &str, project: &str) -> BoardResult<Task> {
        if project.trim().is_empty() {
            return Err(ValidationError::EmptyProject.into());
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText.into());
        }
        if !self.state.has_project(project) {
            return Err(ValidationError::UnknownProject(project.to_string()).into());
        }

        let next_id = self
            .last_task_id
            .checked_add(1)
            .ok_or(ValidationError::TaskIdsExhausted)?;
        let id = self.clock.now_millis().max(next_id);
        let priority = ordering::end_slot(&self.state, project, None);
        let task = Task::new(id, text, project, priority);

        let mut next = self.state.clone();
        next.tasks.push(task.clone());
        self.commit(next, "task_add")?;
        self.last_task_id = id;
        info!(
            "event=task_add module=service status=ok task_id={} priority={}",
            id, priority
        );
        Ok(task)
    }

    /// Flips completion of task `id`; returns the updated task.
    pub fn toggle_task(&mut self, id: TaskId) -> BoardResult<Option<Task>> {
        let mut next = self.state.clone();
        let now = self.clock.now();
        let Some(task) = next.task_mut(id) else {
            debug!("event=task_toggle module=service status=not_found task_id={id}");
            return Ok(None);
        };

        if task.completed {
            task.reactivate();
            ordering::place_reactivated(&mut next, id, self.config.reactivation);
        } else {
            task.complete(now);
        }
        let updated = next.task(id).cloned();
        self.commit(next, "task_toggle")?;
        if let Some(task) = &updated {
            info!(
                "event=task_toggle module=service status=ok task_id={} completed={}",
                id, task.completed
            );
        }
        Ok(updated)
    }

    /// Removes task `id`. Remaining priorities keep their gaps.
    pub fn delete_task(&mut self, id: TaskId) -> BoardResult<bool> {
        if self.state.task(id).is_none() {
            debug!("event=task_delete module=service status=not_found task_id={id}");
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.tasks.retain(|task| task.id != id);
        self.commit(next, "task_delete")?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(true)
    }

    /// Appends a project column with a random color; returns the stored name.
    pub fn add_project(&mut self, name: &str) -> BoardResult<String> {
        let name = validate_project_name(name)?;
        if self.state.has_project(&name) {
            return Err(ValidationError::DuplicateProject(name).into());
        }

        let mut next = self.state.clone();
        next.projects.push(name.clone());
        next.project_colors.insert(name.clone(), random_color());
        self.commit(next, "project_add")?;
        info!(
            "event=project_add module=service status=ok projects={}",
            self.state.projects.len()
        );
        Ok(name)
    }

    /// Flips the hidden flag; returns the new flag.
    pub fn toggle_project_visibility(&mut self, name: &str) -> BoardResult<Option<bool>> {
        if !self.state.has_project(name) {
            debug!("event=project_visibility module=service status=not_found");
            return Ok(None);
        }
        let mut next = self.state.clone();
        let hidden = if next.hidden_projects.remove(name) {
            false
        } else {
            next.hidden_projects.insert(name.to_string());
            true
        };
        self.commit(next, "project_visibility")?;
        Ok(Some(hidden))
    }

    /// Overwrites the color of project `name`.
    pub fn set_project_color(&mut self, name: &str, color: &str) -> BoardResult<bool> {
        if !self.state.has_project(name) {
            debug!("event=project_color module=service status=not_found");
            return Ok(false);
        }
        let color = validate_color(color)?;
        let mut next = self.state.clone();
        next.project_colors.insert(name.to_string(), color);
        self.commit(next, "project_color")?;
        Ok(true)
    }

    /// Drag-and-drop move; see [`ordering::move_task`] for slot semantics.
    pub fn move_task(
        &mut self,
        id: TaskId,
        target_project: &str,
        target_slot: Option<u32>,
    ) -> BoardResult<bool> {
        if !self.state.has_project(target_project) {
            debug!("event=task_move module=service status=not_found task_id={id}");
            return Ok(false);
        }
        let mut next = self.state.clone();
        if !ordering::move_task(&mut next, id, target_project, target_slot) {
            debug!("event=task_move module=service status=skipped task_id={id}");
            return Ok(false);
        }
        let priority = next.task(id).map(|task| task.priority);
        self.commit(next, "task_move")?;
        info!(
            "event=task_move module=service status=ok task_id={} priority={:?}",
            id, priority
        );
        Ok(true)
    }

    /// Compacts `project` to `0..n-1`; persists only when something changed.
    pub fn normalize_priorities(&mut self, project: &str) -> BoardResult<bool> {
        let mut next = self.state.clone();
        if !ordering::normalize_priorities(&mut next, project) {
            return Ok(false);
        }
        self.commit(next, "priorities_normalize")?;
        Ok(true)
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> BoardResult<()> {
        if self.state.dark_mode == enabled {
            return Ok(());
        }
        let mut next = self.state.clone();
        next.dark_mode = enabled;
        self.commit(next, "dark_mode")
    }

    /// Returns the new dark-mode flag.
    pub fn toggle_dark_mode(&mut self) -> BoardResult<bool> {
        let enabled = !self.state.dark_mode;
        self.set_dark_mode(enabled)?;
        Ok(enabled)
    }

    /// Expands or collapses the completed list. Session only.
    pub fn toggle_completed_visible(&mut self) -> bool {
        self.show_completed = !self.show_completed;
        self.show_completed
    }

    /// Writes the current state, e.g. to upgrade a legacy store eagerly.
    pub fn save(&self) -> BoardResult<()> {
        save_board(&self.repo, &self.state)?;
        Ok(())
    }

    fn commit(&mut self, next: BoardState, event: &str) -> BoardResult<()> {
        if let Err(err) = save_board(&self.repo, &next) {
            error!("event={event} module=service status=error error={err}");
            return Err(err.into());
        }
        self.state = next;
        Ok(())
    }
}
