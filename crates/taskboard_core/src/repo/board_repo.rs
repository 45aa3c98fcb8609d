//! Board codec over a blob store.
//!
//! # Responsibility
//! - Write the board as independent JSON blobs plus a `schemaVersion` key.
//! - Read any supported schema version and migrate it to the current shape.
//!
//! # Invariants
//! - A malformed blob never fails the load: that key falls back to its
//!   default and is reported in `LoadOutcome::recovered`.
//! - Malformed task entries are dropped one by one; the rest survive.
//! - A stored schema version newer than `SCHEMA_VERSION` is an error.
//!
//! Version 0 is the unversioned layout that kept tasks under `todos`.

use crate::model::board::BoardState;
use crate::model::task::Task;
use crate::repo::blob_repo::BlobRepository;
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub const SCHEMA_VERSION: u32 = 1;

pub const KEY_SCHEMA_VERSION: &str = "schemaVersion";
pub const KEY_TASKS: &str = "tasks";
pub const KEY_LEGACY_TASKS: &str = "todos";
pub const KEY_PROJECTS: &str = "projects";
pub const KEY_HIDDEN_PROJECTS: &str = "hiddenProjects";
pub const KEY_PROJECT_COLORS: &str = "projectColors";
pub const KEY_DARK_MODE: &str = "darkMode";

/// One stored value that was replaced by a default or partially dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredKey {
    pub key: String,
    pub detail: String,
}

/// Result of reading a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub state: BoardState,
    /// Schema version found in the store before migration.
    pub from_version: u32,
    pub recovered: Vec<RecoveredKey>,
}

/// Writes every board key and drops the legacy `todos` key in one
/// `write_batch` call, so transactional stores commit the board atomically.
pub fn save_board<R: BlobRepository + ?Sized>(repo: &R, state: &BoardState) -> RepoResult<()> {
    let hidden: Vec<&String> = state.hidden_projects.iter().collect();
    let entries = [
        (KEY_TASKS, serde_json::to_string(&state.tasks)?),
        (KEY_PROJECTS, serde_json::to_string(&state.projects)?),
        (KEY_HIDDEN_PROJECTS, serde_json::to_string(&hidden)?),
        (KEY_PROJECT_COLORS, serde_json::to_string(&state.project_colors)?),
        (KEY_DARK_MODE, serde_json::to_string(&state.dark_mode)?),
        (KEY_SCHEMA_VERSION, SCHEMA_VERSION.to_string()),
    ];
    repo.write_batch(&entries, &[KEY_LEGACY_TASKS])?;
    Ok(())
}

/// Reads the board, substituting defaults for missing or malformed keys.
pub fn load_board<R: BlobRepository + ?Sized>(
    repo: &R,
    default_projects: &[String],
) -> RepoResult<LoadOutcome> {
    let mut recovered = Vec::new();
    let from_version = read_schema_version(repo, &mut recovered)?;

    let tasks_raw = if from_version == 0 {
        match repo.get(KEY_LEGACY_TASKS)? {
            Some(raw) => Some(raw),
            None => repo.get(KEY_TASKS)?,
        }
    } else {
        repo.get(KEY_TASKS)?
    };
    let tasks = match tasks_raw {
        Some(raw) => decode_tasks(&raw, &mut recovered),
        None => Vec::new(),
    };

    let projects: Vec<String> =
        read_or_default(repo, KEY_PROJECTS, &mut recovered, || default_projects.to_vec())?;
    let projects = dedupe_projects(projects, &mut recovered);
    let hidden: Vec<String> =
        read_or_default(repo, KEY_HIDDEN_PROJECTS, &mut recovered, Vec::new)?;
    let hidden_projects: BTreeSet<String> = hidden.into_iter().collect();
    let project_colors: BTreeMap<String, String> =
        read_or_default(repo, KEY_PROJECT_COLORS, &mut recovered, BTreeMap::new)?;
    let dark_mode: bool = read_or_default(repo, KEY_DARK_MODE, &mut recovered, || false)?;

    for entry in &recovered {
        warn!(
            "event=board_load module=repo status=recovered key={} detail={}",
            entry.key, entry.detail
        );
    }
    info!(
        "event=board_load module=repo status=ok from_version={} tasks={} projects={} recovered={}",
        from_version,
        tasks.len(),
        projects.len(),
        recovered.len()
    );

    Ok(LoadOutcome {
        state: BoardState {
            tasks,
            projects,
            hidden_projects,
            project_colors,
            dark_mode,
        },
        from_version,
        recovered,
    })
}

fn read_schema_version<R: BlobRepository + ?Sized>(
    repo: &R,
    recovered: &mut Vec<RecoveredKey>,
) -> RepoResult<u32> {
    let Some(raw) = repo.get(KEY_SCHEMA_VERSION)? else {
        return Ok(0);
    };
    match raw.trim().parse::<u32>() {
        Ok(stored) if stored > SCHEMA_VERSION => Err(RepoError::UnsupportedSchemaVersion {
            stored,
            latest_supported: SCHEMA_VERSION,
        }),
        Ok(stored) => Ok(stored),
        Err(err) => {
            recovered.push(RecoveredKey {
                key: KEY_SCHEMA_VERSION.to_string(),
                detail: format!("unreadable version `{raw}`: {err}"),
            });
            Ok(SCHEMA_VERSION)
        }
    }
}

fn read_or_default<R, T>(
    repo: &R,
    key: &str,
    recovered: &mut Vec<RecoveredKey>,
    default: impl FnOnce() -> T,
) -> RepoResult<T>
where
    R: BlobRepository + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = repo.get(key)? else {
        return Ok(default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            recovered.push(RecoveredKey {
                key: key.to_string(),
                detail: err.to_string(),
            });
            Ok(default())
        }
    }
}

fn decode_tasks(raw: &str, recovered: &mut Vec<RecoveredKey>) -> Vec<Task> {
    let entries: Vec<Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(err) => {
            recovered.push(RecoveredKey {
                key: KEY_TASKS.to_string(),
                detail: err.to_string(),
            });
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let task = match serde_json::from_value::<Task>(entry) {
            Ok(task) => task,
            Err(err) => {
                recovered.push(RecoveredKey {
                    key: KEY_TASKS.to_string(),
                    detail: format!("entry {index}: {err}"),
                });
                continue;
            }
        };
        if let Err(err) = task.validate() {
            recovered.push(RecoveredKey {
                key: KEY_TASKS.to_string(),
                detail: format!("entry {index}: {err}"),
            });
            continue;
        }
        if !seen.insert(task.id) {
            recovered.push(RecoveredKey {
                key: KEY_TASKS.to_string(),
                detail: format!("entry {index}: duplicate id {}", task.id),
            });
            continue;
        }
        tasks.push(task);
    }
    tasks
}

fn dedupe_projects(projects: Vec<String>, recovered: &mut Vec<RecoveredKey>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(projects.len());
    for name in projects {
        if name.trim().is_empty() || !seen.insert(name.clone()) {
            recovered.push(RecoveredKey {
                key: KEY_PROJECTS.to_string(),
                detail: format!("dropped project entry `{name}`"),
            });
            continue;
        }
        kept.push(name);
    }
    kept
}
