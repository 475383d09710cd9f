//! Repository for the `jobs` table.
//!
//! Every transition method guards on the expected current status in its
//! `WHERE` clause and returns `None` when the guard fails, so the status
//! machine in `reviewhub_core::job` is enforced atomically at the row
//! level — two racing transitions can never both win.

use sqlx::PgPool;

use reviewhub_core::job::{JobKind, JobStatus};
use reviewhub_core::types::DbId;

use crate::models::job::{Job, JobListQuery, SubmitJob};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, kind, status_id, owner_id, industry_id, new_cleaned_id, \
    use_past_reviews, progress, result_ref, error, created_at, updated_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides persistence for background jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new pending job.
    ///
    /// The partial unique index `uq_jobs_active_scope` rejects a second
    /// active job for the same (owner, kind, industry); callers pre-check
    /// with [`Self::find_active_for_scope`] for a friendly error and rely
    /// on the index against races.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &SubmitJob,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (kind, status_id, owner_id, industry_id, new_cleaned_id, use_past_reviews) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(input.kind.as_str())
            .bind(JobStatus::Pending.id())
            .bind(owner_id)
            .bind(input.industry_id)
            .bind(input.new_cleaned_id)
            .bind(input.use_past_reviews.unwrap_or(true))
            .fetch_one(pool)
            .await
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The active (pending/processing) job for a scope, if any.
    pub async fn find_active_for_scope(
        pool: &PgPool,
        owner_id: DbId,
        kind: JobKind,
        industry_id: DbId,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE owner_id = $1 AND kind = $2 AND industry_id = $3 \
               AND status_id IN ($4, $5)"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(owner_id)
            .bind(kind.as_str())
            .bind(industry_id)
            .bind(JobStatus::Pending.id())
            .bind(JobStatus::Processing.id())
            .fetch_optional(pool)
            .await
    }

    /// The most recent active job for a user across all scopes, if any.
    pub async fn find_active_for_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE owner_id = $1 AND status_id IN ($2, $3) \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(owner_id)
            .bind(JobStatus::Pending.id())
            .bind(JobStatus::Processing.id())
            .fetch_optional(pool)
            .await
    }

    /// Transition pending -> processing. `None` if the job is not pending.
    pub async fn start(pool: &PgPool, job_id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(JobStatus::Processing.id())
            .bind(JobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Update progress while processing. `GREATEST` keeps the value
    /// monotonic even if reports arrive out of order. `None` if the job is
    /// not processing.
    pub async fn update_progress(
        pool: &PgPool,
        job_id: DbId,
        progress: f32,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET progress = GREATEST(progress, $2), updated_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(progress)
            .bind(JobStatus::Processing.id())
            .fetch_optional(pool)
            .await
    }

    /// Transition processing -> completed with the produced artifact.
    /// `None` if the job is not processing.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        result_ref: DbId,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET status_id = $2, result_ref = $3, progress = 100, updated_at = NOW() \
             WHERE id = $1 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(JobStatus::Completed.id())
            .bind(result_ref)
            .bind(JobStatus::Processing.id())
            .fetch_optional(pool)
            .await
    }

    /// Transition pending/processing -> failed with an error message.
    /// `None` if the job is already terminal.
    pub async fn fail(
        pool: &PgPool,
        job_id: DbId,
        error: &str,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET status_id = $2, error = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id IN ($4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(JobStatus::Failed.id())
            .bind(error)
            .bind(JobStatus::Pending.id())
            .bind(JobStatus::Processing.id())
            .fetch_optional(pool)
            .await
    }

    /// Transition pending -> cancelled (a cancel request that lands before
    /// execution starts). `None` if the job is not pending.
    pub async fn cancel_pending(
        pool: &PgPool,
        job_id: DbId,
        notice: &str,
    ) -> Result<Option<Job>, sqlx::Error> {
        Self::cancel_from(pool, job_id, JobStatus::Pending, notice).await
    }

    /// Transition processing -> cancelled (the worker acknowledged the
    /// cancellation signal). `None` if the job is not processing.
    pub async fn cancel_processing(
        pool: &PgPool,
        job_id: DbId,
        notice: &str,
    ) -> Result<Option<Job>, sqlx::Error> {
        Self::cancel_from(pool, job_id, JobStatus::Processing, notice).await
    }

    async fn cancel_from(
        pool: &PgPool,
        job_id: DbId,
        from: JobStatus,
        notice: &str,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET status_id = $2, error = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(JobStatus::Cancelled.id())
            .bind(notice)
            .bind(from.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark every job left `processing` by a dead process as failed.
    /// Run once at startup, before the runner accepts new work.
    pub async fn fail_orphaned(pool: &PgPool, error: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs SET status_id = $1, error = $2, updated_at = NOW() \
             WHERE status_id = $3",
        )
        .bind(JobStatus::Failed.id())
        .bind(error)
        .bind(JobStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List a user's jobs with optional kind/status filters and pagination.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let mut conditions = vec!["owner_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.kind.is_some() {
            conditions.push(format!("kind = ${bind_idx}"));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE {} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Job>(&query).bind(owner_id);
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        if let Some(kind) = params.kind {
            q = q.bind(kind.as_str());
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }
}
