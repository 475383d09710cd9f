//! Per-job execution context: outbound progress, inbound cancellation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use reviewhub_core::types::DbId;

use crate::error::PipelineError;

/// Sink for progress reports, implemented by the job lifecycle tracker.
///
/// Reports are fire-and-forget from the executor's point of view: a report
/// that loses a race with a terminal transition is dropped by the
/// implementation, never bubbled back into the pipeline.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, job_id: DbId, progress: f32);
}

/// Handle given to an executor for the duration of one job.
pub struct JobContext {
    job_id: DbId,
    cancel: CancellationToken,
    progress: Arc<dyn ProgressReporter>,
}

impl JobContext {
    pub fn new(
        job_id: DbId,
        cancel: CancellationToken,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            job_id,
            cancel,
            progress,
        }
    }

    pub fn job_id(&self) -> DbId {
        self.job_id
    }

    /// Report progress in [0, 100]. Values are clamped; the store keeps
    /// them monotonic.
    pub async fn report_progress(&self, progress: f32) {
        self.progress
            .report(self.job_id, progress.clamp(0.0, 100.0))
            .await;
    }

    /// Cooperative cancellation checkpoint.
    ///
    /// Executors call this before each unit of work; once the signal is
    /// set, every subsequent checkpoint returns `Err(Cancelled)` and the
    /// executor is expected to return that error unchanged.
    pub fn checkpoint(&self) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;

    use super::*;

    struct RecordingReporter {
        reports: Mutex<Vec<(DbId, f32)>>,
    }

    #[async_trait]
    impl ProgressReporter for RecordingReporter {
        async fn report(&self, job_id: DbId, progress: f32) {
            self.reports.lock().unwrap().push((job_id, progress));
        }
    }

    fn context(token: CancellationToken) -> (JobContext, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter {
            reports: Mutex::new(Vec::new()),
        });
        (JobContext::new(7, token, reporter.clone()), reporter)
    }

    #[tokio::test]
    async fn checkpoint_passes_until_cancelled() {
        let token = CancellationToken::new();
        let (ctx, _) = context(token.clone());

        assert_matches!(ctx.checkpoint(), Ok(()));

        token.cancel();

        assert_matches!(ctx.checkpoint(), Err(PipelineError::Cancelled));
        assert_matches!(ctx.checkpoint(), Err(PipelineError::Cancelled));
    }

    #[tokio::test]
    async fn progress_is_forwarded_and_clamped() {
        let (ctx, reporter) = context(CancellationToken::new());

        ctx.report_progress(30.0).await;
        ctx.report_progress(150.0).await;
        ctx.report_progress(-5.0).await;

        let reports = reporter.reports.lock().unwrap().clone();
        assert_eq!(reports, vec![(7, 30.0), (7, 100.0), (7, 0.0)]);
    }
}
