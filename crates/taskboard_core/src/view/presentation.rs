//! Pending presentations between a mutation and its follow-up render.
//!
//! A mutation is applied and persisted first. The caller then starts an
//! animation and registers it here. The follow-up render runs when the
//! animation reports its end, or when the deadline passes without one.
//!
//! # Invariants
//! - Each registered entry completes at most once.
//! - A cancelled entry never completes.
//! - Registering the same task again replaces the earlier entry.

use crate::model::task::TaskId;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::BTreeMap;

/// Animation started for a task element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// New task appears.
    Enter,
    /// Task moves to the completed list.
    Complete,
    /// Task returns to its column.
    Reactivate,
    /// Task is removed.
    Delete,
    /// Input rejected; shake the control.
    Reject,
}

/// How a pending entry was completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    AnimationEnded,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationCompletion {
    pub task_id: TaskId,
    pub kind: AnimationKind,
    pub reason: CompletionReason,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    kind: AnimationKind,
    deadline: DateTime<Utc>,
}

/// Tracks presentations awaiting their follow-up render.
#[derive(Debug)]
pub struct PresentationTracker {
    timeout: Duration,
    pending: BTreeMap<TaskId, Pending>,
}

impl PresentationTracker {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout: Duration::milliseconds(i64::try_from(timeout_ms).unwrap_or(i64::MAX)),
            pending: BTreeMap::new(),
        }
    }

    /// Registers an animation started at `now`.
    pub fn begin(&mut self, task_id: TaskId, kind: AnimationKind, now: DateTime<Utc>) {
        let deadline = now
            .checked_add_signed(self.timeout)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.pending.insert(task_id, Pending { kind, deadline });
    }

    /// Animation-end signal. `None` when nothing was pending for the task.
    pub fn finish(&mut self, task_id: TaskId) -> Option<PresentationCompletion> {
        self.pending
            .remove(&task_id)
            .map(|pending| PresentationCompletion {
                task_id,
                kind: pending.kind,
                reason: CompletionReason::AnimationEnded,
            })
    }

    /// Completes every entry whose deadline is at or before `now`.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<PresentationCompletion> {
        let due: Vec<TaskId> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(task_id, _)| *task_id)
            .collect();

        due.into_iter()
            .filter_map(|task_id| {
                let pending = self.pending.remove(&task_id)?;
                debug!(
                    "event=presentation_timeout module=view status=ok task_id={} kind={:?}",
                    task_id, pending.kind
                );
                Some(PresentationCompletion {
                    task_id,
                    kind: pending.kind,
                    reason: CompletionReason::TimedOut,
                })
            })
            .collect()
    }

    /// Drops the entry for an element that disappeared.
    pub fn cancel(&mut self, task_id: TaskId) -> bool {
        self.pending.remove(&task_id).is_some()
    }

    pub fn is_pending(&self, task_id: TaskId) -> bool {
        self.pending.contains_key(&task_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest deadline, for scheduling the next `expire` call.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.values().map(|pending| pending.deadline).min()
    }
}

#[cfg(test)]
mod tests {
    use super::{AnimationKind, CompletionReason, PresentationTracker};
    use chrono::{DateTime, Duration};

    #[test]
    fn finish_completes_once() {
        let now = DateTime::from_timestamp_millis(0).unwrap();
        let mut tracker = PresentationTracker::new(500);
        tracker.begin(7, AnimationKind::Complete, now);

        let done = tracker.finish(7).unwrap();
        assert_eq!(done.reason, CompletionReason::AnimationEnded);
        assert_eq!(done.kind, AnimationKind::Complete);
        assert!(tracker.finish(7).is_none());
        assert!(tracker.expire(now + Duration::seconds(10)).is_empty());
    }

    #[test]
    fn missing_end_signal_times_out() {
        let now = DateTime::from_timestamp_millis(0).unwrap();
        let mut tracker = PresentationTracker::new(500);
        tracker.begin(1, AnimationKind::Delete, now);
        tracker.begin(2, AnimationKind::Enter, now + Duration::milliseconds(400));

        assert!(tracker.expire(now + Duration::milliseconds(499)).is_empty());
        let expired = tracker.expire(now + Duration::milliseconds(500));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].task_id, 1);
        assert_eq!(expired[0].reason, CompletionReason::TimedOut);
        assert_eq!(
            tracker.next_deadline(),
            Some(now + Duration::milliseconds(900))
        );
    }

    #[test]
    fn cancel_prevents_completion() {
        let now = DateTime::from_timestamp_millis(0).unwrap();
        let mut tracker = PresentationTracker::new(100);
        tracker.begin(3, AnimationKind::Reactivate, now);

        assert!(tracker.cancel(3));
        assert!(!tracker.is_pending(3));
        assert!(tracker.expire(now + Duration::seconds(1)).is_empty());
        assert_eq!(tracker.pending_count(), 0);
    }
}
