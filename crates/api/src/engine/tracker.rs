//! The job lifecycle tracker.
//!
//! All job mutations go through this type: request handlers create and
//! cancel, the background runner starts, reports, completes, fails, and
//! acknowledges. Each successful transition publishes the fresh snapshot
//! to the hub; terminal transitions also clear the job's cancellation
//! signal and per-job lock.
//!
//! Transitions for one job are serialized by a per-job async mutex, so
//! snapshots reach the hub in transition order. The SQL layer re-checks
//! the expected current status on every update, so even a bypassing
//! writer could not produce an illegal transition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use reviewhub_core::cancellation::CancelRegistry;
use reviewhub_core::error::CoreError;
use reviewhub_core::job::{JobKind, JobStatus};
use reviewhub_core::types::DbId;
use reviewhub_db::models::job::{Job, SubmitJob};
use reviewhub_db::repositories::JobRepo;
use reviewhub_db::DbPool;
use reviewhub_pipeline::ProgressReporter;

use crate::error::{AppError, AppResult};
use crate::ws::JobHub;

/// Notice recorded on cancelled jobs (mirrors the `error` column usage of
/// failed jobs; never exposed in snapshots unless the job failed).
const CANCELLED_NOTICE: &str = "Cancelled by user";

pub struct JobTracker {
    pool: DbPool,
    hub: Arc<JobHub>,
    cancellations: Arc<CancelRegistry>,
    locks: Mutex<HashMap<DbId, Arc<tokio::sync::Mutex<()>>>>,
}

impl JobTracker {
    pub fn new(pool: DbPool, hub: Arc<JobHub>, cancellations: Arc<CancelRegistry>) -> Self {
        Self {
            pool,
            hub,
            cancellations,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn cancellations(&self) -> &Arc<CancelRegistry> {
        &self.cancellations
    }

    /// Create a new pending job.
    ///
    /// Rejects with a conflict while another job for the same
    /// (owner, kind, industry) scope is still pending or processing. The
    /// partial unique index backs this check up against races.
    pub async fn create(&self, owner_id: DbId, input: &SubmitJob) -> AppResult<Job> {
        if let Some(active) =
            JobRepo::find_active_for_scope(&self.pool, owner_id, input.kind, input.industry_id)
                .await?
        {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "A {} job is already {} for this industry (job {})",
                active.kind,
                active.status(),
                active.id,
            ))));
        }

        let job = JobRepo::create(&self.pool, owner_id, input).await?;
        tracing::info!(
            job_id = job.id,
            kind = %job.kind,
            owner_id,
            industry_id = input.industry_id,
            "Job created",
        );
        Ok(job)
    }

    /// Transition pending -> processing.
    pub async fn start(&self, job_id: DbId) -> AppResult<Job> {
        let lock = self.job_lock(job_id);
        let _guard = lock.lock().await;

        match JobRepo::start(&self.pool, job_id).await? {
            Some(job) => {
                self.publish(&job).await;
                Ok(job)
            }
            None => Err(self.rejection(job_id, JobStatus::Processing).await?),
        }
    }

    /// Update progress while processing. The store keeps the value
    /// monotonic; a report for a job that is no longer processing is
    /// rejected with the invalid-state error and changes nothing.
    pub async fn report_progress(&self, job_id: DbId, progress: f32) -> AppResult<Job> {
        if !(0.0..=100.0).contains(&progress) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "progress must be within [0, 100], got {progress}"
            ))));
        }

        let lock = self.job_lock(job_id);
        let _guard = lock.lock().await;

        match JobRepo::update_progress(&self.pool, job_id, progress).await? {
            Some(job) => {
                self.publish(&job).await;
                Ok(job)
            }
            None => Err(self.rejection(job_id, JobStatus::Processing).await?),
        }
    }

    /// Transition processing -> completed with the produced artifact.
    pub async fn complete(&self, job_id: DbId, result_ref: DbId) -> AppResult<Job> {
        let lock = self.job_lock(job_id);
        let _guard = lock.lock().await;

        match JobRepo::complete(&self.pool, job_id, result_ref).await? {
            Some(job) => {
                tracing::info!(job_id, result_ref, "Job completed");
                self.finish(&job).await;
                Ok(job)
            }
            None => Err(self.rejection(job_id, JobStatus::Completed).await?),
        }
    }

    /// Transition pending/processing -> failed.
    pub async fn fail(&self, job_id: DbId, error: &str) -> AppResult<Job> {
        let lock = self.job_lock(job_id);
        let _guard = lock.lock().await;

        match JobRepo::fail(&self.pool, job_id, error).await? {
            Some(job) => {
                tracing::warn!(job_id, error, "Job failed");
                self.finish(&job).await;
                Ok(job)
            }
            None => Err(self.rejection(job_id, JobStatus::Failed).await?),
        }
    }

    /// Request cancellation.
    ///
    /// A pending job is cancelled synchronously. A processing job only
    /// gets its signal set; the status stays processing until the worker
    /// observes the signal and calls [`Self::acknowledge_cancel`]. The
    /// returned row reflects whichever of the two happened.
    pub async fn cancel_request(&self, job_id: DbId) -> AppResult<Job> {
        let lock = self.job_lock(job_id);
        let _guard = lock.lock().await;

        let job = JobRepo::find_by_id(&self.pool, job_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Job",
                id: job_id,
            }))?;

        match job.status() {
            JobStatus::Pending => {
                match JobRepo::cancel_pending(&self.pool, job_id, CANCELLED_NOTICE).await? {
                    Some(cancelled) => {
                        tracing::info!(job_id, "Pending job cancelled");
                        self.finish(&cancelled).await;
                        Ok(cancelled)
                    }
                    None => {
                        // Lost the race with start(); fall through to the
                        // cooperative signal.
                        self.cancellations.request(job_id);
                        tracing::info!(job_id, "Cancellation requested");
                        Ok(JobRepo::find_by_id(&self.pool, job_id).await?.unwrap_or(job))
                    }
                }
            }
            JobStatus::Processing => {
                self.cancellations.request(job_id);
                tracing::info!(job_id, "Cancellation requested");
                Ok(job)
            }
            status => Err(AppError::Core(CoreError::InvalidState {
                from: status,
                to: JobStatus::Cancelled,
            })),
        }
    }

    /// Transition processing -> cancelled, called by the worker after it
    /// observed the cancellation signal at a checkpoint.
    pub async fn acknowledge_cancel(&self, job_id: DbId) -> AppResult<Job> {
        let lock = self.job_lock(job_id);
        let _guard = lock.lock().await;

        match JobRepo::cancel_processing(&self.pool, job_id, CANCELLED_NOTICE).await? {
            Some(job) => {
                tracing::info!(job_id, "Job cancelled (worker acknowledged)");
                self.finish(&job).await;
                Ok(job)
            }
            None => Err(self.rejection(job_id, JobStatus::Cancelled).await?),
        }
    }

    /// Publish a non-terminal snapshot.
    async fn publish(&self, job: &Job) {
        self.hub.publish(job.id, &job.snapshot()).await;
    }

    /// Publish a terminal snapshot and release the job's signal and lock.
    async fn finish(&self, job: &Job) {
        self.hub.publish(job.id, &job.snapshot()).await;
        self.cancellations.clear(job.id);
        self.locks
            .lock()
            .expect("job lock map poisoned")
            .remove(&job.id);
    }

    /// Build the error for a transition whose status guard failed:
    /// missing row means not-found, anything else is an invalid state.
    async fn rejection(&self, job_id: DbId, to: JobStatus) -> Result<AppError, AppError> {
        let err = match JobRepo::find_by_id(&self.pool, job_id).await? {
            Some(job) => {
                tracing::warn!(
                    job_id,
                    from = %job.status(),
                    to = %to,
                    "Invalid job transition ignored",
                );
                AppError::Core(CoreError::InvalidState {
                    from: job.status(),
                    to,
                })
            }
            None => AppError::Core(CoreError::NotFound {
                entity: "Job",
                id: job_id,
            }),
        };
        Ok(err)
    }

    fn job_lock(&self, job_id: DbId) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(
            self.locks
                .lock()
                .expect("job lock map poisoned")
                .entry(job_id)
                .or_default(),
        )
    }
}

#[async_trait]
impl ProgressReporter for JobTracker {
    /// Executor-facing progress sink. A report that loses a race with a
    /// terminal transition is dropped silently, per the tolerated-race
    /// policy.
    async fn report(&self, job_id: DbId, progress: f32) {
        if let Err(e) = self.report_progress(job_id, progress).await {
            tracing::debug!(job_id, progress = %progress, error = %e, "Progress report dropped");
        }
    }
}

/// Used by the kind dispatch in [`crate::engine::runner`].
pub fn kind_of(job: &Job) -> AppResult<JobKind> {
    job.kind().ok_or_else(|| {
        AppError::InternalError(format!("job {} has unknown kind '{}'", job.id, job.kind))
    })
}
