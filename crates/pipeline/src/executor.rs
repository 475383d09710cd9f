//! The executor trait implemented once per job kind.

use async_trait::async_trait;

use reviewhub_core::job::JobKind;
use reviewhub_core::types::DbId;
use reviewhub_db::models::job::Job;

use crate::context::JobContext;
use crate::error::PipelineError;

/// What a successful execution produced.
#[derive(Debug, Clone, Copy)]
pub struct JobOutcome {
    /// Identifier of the produced artifact (final review row, index row).
    pub result_ref: DbId,
}

/// One background job kind's implementation.
///
/// `execute` runs inside a spawned task. It must poll
/// [`JobContext::checkpoint`] between units of work and return
/// [`PipelineError::Cancelled`] unchanged when a checkpoint trips; any
/// other error marks the job failed.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// The job kind this executor handles.
    fn kind(&self) -> JobKind;

    /// Run the job to completion, cancellation, or failure.
    async fn execute(&self, ctx: &JobContext, job: &Job) -> Result<JobOutcome, PipelineError>;
}
