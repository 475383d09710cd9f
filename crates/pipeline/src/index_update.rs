//! Executor for `index_update` jobs.
//!
//! Walks an industry's review rows in pages and refreshes the `indexes`
//! row with the covered count. Embedding construction for the retrieval
//! side happens in the external retrieval service; this job maintains the
//! authoritative coverage record the UI and the classifier consult.

use async_trait::async_trait;

use reviewhub_core::job::JobKind;
use reviewhub_db::models::job::Job;
use reviewhub_db::models::review::ReviewListQuery;
use reviewhub_db::repositories::{IndexRepo, ReviewRepo};
use reviewhub_db::DbPool;

use crate::context::JobContext;
use crate::error::PipelineError;
use crate::executor::{JobExecutor, JobOutcome};

/// Review rows scanned per checkpoint.
const PAGE_SIZE: i64 = 100;

pub struct IndexUpdateExecutor {
    pool: DbPool,
}

impl IndexUpdateExecutor {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobExecutor for IndexUpdateExecutor {
    fn kind(&self) -> JobKind {
        JobKind::IndexUpdate
    }

    async fn execute(&self, ctx: &JobContext, job: &Job) -> Result<JobOutcome, PipelineError> {
        let total = ReviewRepo::count_by_industry(&self.pool, job.industry_id).await?;

        tracing::info!(
            job_id = ctx.job_id(),
            industry_id = job.industry_id,
            total_reviews = total,
            "Starting index update",
        );

        let mut scanned: i64 = 0;
        loop {
            ctx.checkpoint()?;

            let page = ReviewRepo::list_by_owner(
                &self.pool,
                job.owner_id,
                &ReviewListQuery {
                    industry_id: Some(job.industry_id),
                    stage: None,
                    limit: Some(PAGE_SIZE),
                    offset: Some(scanned),
                },
            )
            .await?;

            if page.is_empty() {
                break;
            }
            scanned += page.len() as i64;

            if total > 0 {
                ctx.report_progress(90.0 * scanned as f32 / total as f32).await;
            }
        }

        let index = IndexRepo::upsert(&self.pool, job.industry_id, job.owner_id, scanned).await?;

        Ok(JobOutcome {
            result_ref: index.id,
        })
    }
}
