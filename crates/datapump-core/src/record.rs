//! Job status records tracked per submitted task.

use crate::{JobId, JobState, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable record of a task's remote job: which job was submitted, where it
/// stands, and what went wrong if anything.
///
/// Transitions are monotonic (Pending -> Running -> {Done | Error}); Done and
/// Error are absorbing. The status checker is the only writer after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusRecord {
    /// Task this record belongs to (store key).
    pub task_id: TaskId,

    /// Remote job id, absent when the task never submitted one
    /// (e.g. rejected before execution).
    pub job_id: Option<JobId>,

    /// Current job state.
    pub state: JobState,

    /// Last error detail, set when the state reaches Error.
    pub error: Option<String>,

    /// When the record was created (job submission time).
    pub submitted_at: DateTime<Utc>,

    /// When the status checker last refreshed this record.
    pub checked_at: Option<DateTime<Utc>>,
}

impl JobStatusRecord {
    /// Create a record for a freshly submitted remote job.
    pub fn new(task_id: TaskId, job_id: JobId, submitted_at: DateTime<Utc>) -> Self {
        Self {
            task_id,
            job_id: Some(job_id),
            state: JobState::Pending,
            error: None,
            submitted_at,
            checked_at: None,
        }
    }

    /// Create a terminal Error record for a task rejected before execution
    /// (malformed parameters). Keeps the failure observable without leaving
    /// the task in the queue.
    pub fn rejected(task_id: TaskId, error: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            task_id,
            job_id: None,
            state: JobState::Error,
            error: Some(error.into()),
            submitted_at: at,
            checked_at: Some(at),
        }
    }

    /// Apply an observed remote state.
    ///
    /// The transition is applied only if it does not move backwards and the
    /// current state is not already terminal; `checked_at` advances either
    /// way. Returns whether the state changed.
    pub fn observe(
        &mut self,
        state: JobState,
        error: Option<String>,
        at: DateTime<Utc>,
    ) -> bool {
        self.checked_at = Some(at);

        if self.state.is_terminal() || state.rank() < self.state.rank() {
            return false;
        }
        let changed = self.state != state;
        self.state = state;
        if state == JobState::Error {
            self.error = error;
        }
        changed
    }

    /// Whether the record is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> JobStatusRecord {
        JobStatusRecord::new(TaskId::new("t1"), JobId::new("j1"), Utc::now())
    }

    #[test]
    fn test_pending_to_running_to_done() {
        let mut rec = record();
        assert!(rec.observe(JobState::Running, None, Utc::now()));
        assert_eq!(rec.state, JobState::Running);
        assert!(rec.observe(JobState::Done, None, Utc::now()));
        assert_eq!(rec.state, JobState::Done);
    }

    #[test]
    fn test_done_is_absorbing() {
        let mut rec = record();
        rec.observe(JobState::Done, None, Utc::now());
        assert!(!rec.observe(JobState::Running, None, Utc::now()));
        assert!(!rec.observe(JobState::Error, Some("late".into()), Utc::now()));
        assert_eq!(rec.state, JobState::Done);
        assert_eq!(rec.error, None);
    }

    #[test]
    fn test_no_backwards_transition() {
        let mut rec = record();
        rec.observe(JobState::Running, None, Utc::now());
        assert!(!rec.observe(JobState::Pending, None, Utc::now()));
        assert_eq!(rec.state, JobState::Running);
    }

    #[test]
    fn test_error_captures_detail() {
        let mut rec = record();
        rec.observe(JobState::Error, Some("quota exceeded".into()), Utc::now());
        assert_eq!(rec.state, JobState::Error);
        assert_eq!(rec.error.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn test_checked_at_advances_even_without_change() {
        let mut rec = record();
        rec.observe(JobState::Done, None, Utc::now());
        let later = Utc::now() + chrono::Duration::minutes(10);
        rec.observe(JobState::Done, None, later);
        assert_eq!(rec.checked_at, Some(later));
    }

    #[test]
    fn test_rejected_is_terminal_without_job() {
        let rec = JobStatusRecord::rejected(TaskId::new("t2"), "bad params", Utc::now());
        assert!(rec.is_terminal());
        assert_eq!(rec.job_id, None);
        assert_eq!(rec.error.as_deref(), Some("bad params"));
    }
}
