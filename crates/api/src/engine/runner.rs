//! Spawns and supervises background job tasks.
//!
//! One executor is registered per job kind at startup. `spawn` hands the
//! job to a tokio task and returns immediately; the task drives the
//! lifecycle through the tracker and is guaranteed to leave the job in a
//! terminal state: any executor error becomes a `fail` transition, and an
//! observed cancellation becomes `acknowledge_cancel`.

use std::collections::HashMap;
use std::sync::Arc;

use reviewhub_core::job::JobKind;
use reviewhub_db::models::job::Job;
use reviewhub_pipeline::{JobContext, JobExecutor, PipelineError, ProgressReporter};

use crate::engine::tracker::{kind_of, JobTracker};
use crate::error::AppResult;

pub struct JobRunner {
    tracker: Arc<JobTracker>,
    executors: HashMap<JobKind, Arc<dyn JobExecutor>>,
}

impl JobRunner {
    pub fn new(tracker: Arc<JobTracker>) -> Self {
        Self {
            tracker,
            executors: HashMap::new(),
        }
    }

    /// Register the executor for its job kind. Later registrations for
    /// the same kind replace earlier ones.
    pub fn register(&mut self, executor: Arc<dyn JobExecutor>) {
        self.executors.insert(executor.kind(), executor);
    }

    /// Hand a freshly created job to a background task and return.
    ///
    /// A job whose kind has no registered executor is failed on the spot
    /// rather than left pending forever.
    pub async fn spawn(&self, job: Job) -> AppResult<()> {
        let kind = kind_of(&job)?;

        let Some(executor) = self.executors.get(&kind).cloned() else {
            tracing::error!(job_id = job.id, %kind, "No executor registered for job kind");
            self.tracker
                .fail(job.id, &format!("no executor for job kind {kind}"))
                .await?;
            return Ok(());
        };

        let tracker = Arc::clone(&self.tracker);
        tokio::spawn(async move {
            run_job(tracker, executor, job).await;
        });
        Ok(())
    }
}

/// Drive one job from pending to a terminal state.
async fn run_job(tracker: Arc<JobTracker>, executor: Arc<dyn JobExecutor>, job: Job) {
    let job_id = job.id;
    let token = tracker.cancellations().token(job_id);

    // The job may have been cancelled between creation and this task
    // getting scheduled; start() then rejects and there is nothing to run.
    let started = match tracker.start(job_id).await {
        Ok(job) => job,
        Err(e) => {
            tracing::info!(job_id, error = %e, "Job did not start");
            return;
        }
    };

    let reporter: Arc<dyn ProgressReporter> = Arc::clone(&tracker) as _;
    let ctx = JobContext::new(job_id, token, reporter);

    match executor.execute(&ctx, &started).await {
        Ok(outcome) => {
            if let Err(e) = tracker.complete(job_id, outcome.result_ref).await {
                tracing::warn!(job_id, error = %e, "Completion lost a transition race");
            }
        }
        Err(PipelineError::Cancelled) => {
            if let Err(e) = tracker.acknowledge_cancel(job_id).await {
                tracing::warn!(job_id, error = %e, "Cancel acknowledgment lost a transition race");
            }
        }
        Err(e) => {
            let message = sanitize_error(&e);
            tracing::error!(job_id, error = %e, "Job execution failed");
            if let Err(e) = tracker.fail(job_id, &message).await {
                tracing::warn!(job_id, error = %e, "Failure report lost a transition race");
            }
        }
    }
}

/// User-facing failure message: internal errors are reduced to their
/// category, executor-authored messages pass through.
fn sanitize_error(error: &PipelineError) -> String {
    match error {
        PipelineError::Database(_) => "database error during job execution".to_string(),
        PipelineError::Io(_) => "file access error during job execution".to_string(),
        PipelineError::Failed(msg) => msg.clone(),
        // Handled by the caller before sanitizing.
        PipelineError::Cancelled => "job cancelled".to_string(),
    }
}
