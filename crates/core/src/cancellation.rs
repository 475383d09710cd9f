//! Cooperative per-job cancellation signals.
//!
//! A cancel request never interrupts a running task: the executing task
//! polls its token at checkpoints and winds down cleanly when it observes
//! the signal. A task that never checks simply runs to its own completion
//! or failure. Signals are cleared when a job reaches a terminal status.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::types::DbId;

/// Registry of per-job cancellation tokens.
///
/// Thread-safe via an interior mutex; designed to be wrapped in `Arc` and
/// shared between the HTTP layer (which requests cancellation) and the
/// background tasks (which observe it).
#[derive(Default)]
pub struct CancelRegistry {
    tokens: Mutex<HashMap<DbId, CancellationToken>>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the token for a job, registering a fresh one if needed.
    ///
    /// The executing task clones this token once at startup and polls it
    /// at checkpoints.
    pub fn token(&self, job_id: DbId) -> CancellationToken {
        self.tokens
            .lock()
            .expect("cancel registry poisoned")
            .entry(job_id)
            .or_default()
            .clone()
    }

    /// Set the cancellation signal for a job.
    ///
    /// Registers the token if the job has not started yet, so a signal
    /// raised while the job is still pending is visible the moment the
    /// worker picks it up.
    pub fn request(&self, job_id: DbId) {
        self.token(job_id).cancel();
    }

    /// Whether cancellation has been requested for a job.
    ///
    /// Unknown job ids report `false`; no token is registered by asking.
    pub fn is_requested(&self, job_id: DbId) -> bool {
        self.tokens
            .lock()
            .expect("cancel registry poisoned")
            .get(&job_id)
            .is_some_and(|t| t.is_cancelled())
    }

    /// Drop a job's token. Called on every terminal transition; safe to
    /// call for unknown ids.
    pub fn clear(&self, job_id: DbId) {
        self.tokens
            .lock()
            .expect("cancel registry poisoned")
            .remove(&job_id);
    }

    /// Number of registered tokens (for diagnostics).
    pub fn len(&self) -> usize {
        self.tokens.lock().expect("cancel registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_visible_through_the_shared_token() {
        let registry = CancelRegistry::new();
        let token = registry.token(1);

        assert!(!token.is_cancelled());
        registry.request(1);
        assert!(token.is_cancelled());
        assert!(registry.is_requested(1));
    }

    #[test]
    fn request_before_the_task_fetches_its_token() {
        let registry = CancelRegistry::new();

        registry.request(2);

        // The worker fetches its token after the signal was raised and
        // still observes it.
        assert!(registry.token(2).is_cancelled());
    }

    #[test]
    fn unknown_jobs_report_not_requested() {
        let registry = CancelRegistry::new();
        assert!(!registry.is_requested(42));
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_removes_the_token() {
        let registry = CancelRegistry::new();
        registry.request(3);
        assert_eq!(registry.len(), 1);

        registry.clear(3);
        assert!(registry.is_empty());
        assert!(!registry.is_requested(3));

        // Clearing again is a no-op.
        registry.clear(3);
    }

    #[test]
    fn signals_are_independent_per_job() {
        let registry = CancelRegistry::new();
        let a = registry.token(1);
        let b = registry.token(2);

        registry.request(1);

        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
    }
}
