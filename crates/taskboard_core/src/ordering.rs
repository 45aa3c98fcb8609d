//! Per-project priority ordering.
//!
//! # Responsibility
//! - Pick insertion slots for new, moved and reactivated tasks.
//! - Re-sequence a project's active tasks after drag-and-drop moves.
//!
//! # Invariants
//! - Priorities are slots, not list indexes: display is a stable sort by
//!   priority, so gaps never change relative order.
//! - After `move_task` the target project is contiguous `0..n-1`.
//! - The source project of a cross-project move is not renumbered.
//! - Completed tasks are never touched.

use crate::config::ReactivationPolicy;
use crate::model::board::BoardState;
use crate::model::task::TaskId;

/// One past the highest active priority in `project`, ignoring `exclude`.
///
/// Equals the active count whenever the project is contiguous.
pub fn end_slot(state: &BoardState, project: &str, exclude: Option<TaskId>) -> u32 {
    state
        .tasks
        .iter()
        .filter(|task| task.is_active_in(project) && Some(task.id) != exclude)
        .map(|task| task.priority.saturating_add(1))
        .max()
        .unwrap_or(0)
}

/// Compacts active priorities of `project` to `0..n-1` in current order.
///
/// Returns `true` when any priority changed.
pub fn normalize_priorities(state: &mut BoardState, project: &str) -> bool {
    let mut indexes: Vec<usize> = state
        .tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.is_active_in(project))
        .map(|(index, _)| index)
        .collect();
    indexes.sort_by_key(|&index| state.tasks[index].priority);

    let mut changed = false;
    for (rank, index) in indexes.into_iter().enumerate() {
        let rank = rank as u32;
        let task = &mut state.tasks[index];
        if task.priority != rank {
            task.priority = rank;
            changed = true;
        }
    }
    changed
}

/// Moves an active task into `target_project`.
///
/// `target_slot` is the priority of the task currently occupying the drop
/// position; the moved task lands before it. `None` appends after every
/// other active task of the target.
///
/// Returns `false` without changes when the task is unknown or completed.
/// The caller is responsible for checking that `target_project` exists.
pub fn move_task(
    state: &mut BoardState,
    task_id: TaskId,
    target_project: &str,
    target_slot: Option<u32>,
) -> bool {
    match state.task(task_id) {
        Some(task) if task.is_active() => {}
        _ => return false,
    }

    let slot = match target_slot {
        Some(slot) => {
            for task in state.tasks.iter_mut() {
                if task.id != task_id && task.is_active_in(target_project) && task.priority >= slot {
                    task.priority = task.priority.saturating_add(1);
                }
            }
            slot
        }
        None => end_slot(state, target_project, Some(task_id)),
    };

    if let Some(task) = state.task_mut(task_id) {
        task.project = target_project.to_string();
        task.priority = slot;
    }
    normalize_priorities(state, target_project);
    true
}

/// Chooses the priority for a task that just became active again.
pub fn place_reactivated(state: &mut BoardState, task_id: TaskId, policy: ReactivationPolicy) {
    if policy == ReactivationPolicy::KeepStale {
        return;
    }
    let Some(project) = state.task(task_id).map(|task| task.project.clone()) else {
        return;
    };
    let slot = end_slot(state, &project, Some(task_id));
    if let Some(task) = state.task_mut(task_id) {
        task.priority = slot;
    }
}

/// Whether `project`'s active priorities are exactly `0..n-1`.
pub fn is_contiguous(state: &BoardState, project: &str) -> bool {
    let mut priorities: Vec<u32> = state
        .tasks
        .iter()
        .filter(|task| task.is_active_in(project))
        .map(|task| task.priority)
        .collect();
    priorities.sort_unstable();
    priorities
        .iter()
        .enumerate()
        .all(|(index, &priority)| priority == index as u32)
}

#[cfg(test)]
mod tests {
    use super::{end_slot, is_contiguous, move_task, normalize_priorities, place_reactivated};
    use crate::config::ReactivationPolicy;
    use crate::model::board::BoardState;
    use crate::model::task::Task;
    use chrono::DateTime;

    fn board(entries: &[(i64, &str, u32)]) -> BoardState {
        let mut state = BoardState::with_projects(["Work", "Personal"]);
        for &(id, project, priority) in entries {
            state.tasks.push(Task::new(id, format!("task {id}"), project, priority));
        }
        state
    }

    fn order(state: &BoardState, project: &str) -> Vec<i64> {
        state.active_tasks(project).iter().map(|task| task.id).collect()
    }

    #[test]
    fn end_slot_skips_gaps_and_excluded_task() {
        let state = board(&[(1, "Work", 0), (2, "Work", 4)]);
        assert_eq!(end_slot(&state, "Work", None), 5);
        assert_eq!(end_slot(&state, "Work", Some(2)), 1);
        assert_eq!(end_slot(&state, "Personal", None), 0);
    }

    #[test]
    fn slot_arithmetic_saturates_at_the_top() {
        let mut state = board(&[(1, "Work", u32::MAX), (2, "Personal", 0)]);
        assert_eq!(end_slot(&state, "Work", None), u32::MAX);

        assert!(move_task(&mut state, 2, "Work", Some(0)));
        assert_eq!(order(&state, "Work"), vec![2, 1]);
        assert!(is_contiguous(&state, "Work"));
    }

    #[test]
    fn normalize_compacts_and_keeps_order() {
        let mut state = board(&[(1, "Work", 7), (2, "Work", 2), (3, "Work", 2)]);
        assert!(normalize_priorities(&mut state, "Work"));
        assert_eq!(order(&state, "Work"), vec![2, 3, 1]);
        assert!(is_contiguous(&state, "Work"));
        assert!(!normalize_priorities(&mut state, "Work"));
    }

    #[test]
    fn move_to_other_project_end() {
        let mut state = board(&[(1, "Work", 0), (2, "Work", 1), (3, "Personal", 0)]);
        assert!(move_task(&mut state, 1, "Personal", None));

        let moved = state.task(1).unwrap();
        assert_eq!(moved.project, "Personal");
        assert_eq!(moved.priority, 1);
        assert_eq!(order(&state, "Personal"), vec![3, 1]);
        // Source keeps its gap.
        assert_eq!(state.task(2).unwrap().priority, 1);
    }

    #[test]
    fn move_before_drop_target_shifts_followers() {
        let mut state = board(&[
            (1, "Work", 0),
            (10, "Personal", 0),
            (11, "Personal", 1),
            (12, "Personal", 2),
        ]);
        assert!(move_task(&mut state, 1, "Personal", Some(1)));
        assert_eq!(order(&state, "Personal"), vec![10, 1, 11, 12]);
        assert!(is_contiguous(&state, "Personal"));
    }

    #[test]
    fn move_within_project_reorders() {
        let mut state = board(&[(1, "Work", 0), (2, "Work", 1), (3, "Work", 2)]);
        assert!(move_task(&mut state, 3, "Work", Some(0)));
        assert_eq!(order(&state, "Work"), vec![3, 1, 2]);

        assert!(move_task(&mut state, 3, "Work", None));
        assert_eq!(order(&state, "Work"), vec![1, 2, 3]);
        assert!(is_contiguous(&state, "Work"));
    }

    #[test]
    fn move_ignores_unknown_and_completed_tasks() {
        let mut state = board(&[(1, "Work", 0)]);
        state.tasks[0].complete(DateTime::from_timestamp_millis(5).unwrap());
        let before = state.clone();

        assert!(!move_task(&mut state, 1, "Personal", None));
        assert!(!move_task(&mut state, 99, "Personal", None));
        assert_eq!(state, before);
    }

    #[test]
    fn reactivation_policy() {
        let mut state = board(&[(1, "Work", 0), (2, "Work", 1)]);

        place_reactivated(&mut state, 1, ReactivationPolicy::KeepStale);
        assert_eq!(state.task(1).unwrap().priority, 0);

        place_reactivated(&mut state, 1, ReactivationPolicy::AppendToEnd);
        assert_eq!(state.task(1).unwrap().priority, 2);
        assert_eq!(order(&state, "Work"), vec![2, 1]);
    }
}
