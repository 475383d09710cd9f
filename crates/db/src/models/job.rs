//! Job entity model and DTOs for the background job subsystem.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reviewhub_core::job::{JobKind, JobStatus, StatusId};
use reviewhub_core::snapshot::JobSnapshot;
use reviewhub_core::types::{DbId, Timestamp};

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub kind: String,
    pub status_id: StatusId,
    pub owner_id: DbId,
    pub industry_id: DbId,
    pub new_cleaned_id: Option<DbId>,
    pub use_past_reviews: bool,
    pub progress: f32,
    pub result_ref: Option<DbId>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// Decode the `status_id` column.
    ///
    /// The column is constrained to the seed table, so an unknown id means
    /// the enum and the seed data have drifted apart.
    pub fn status(&self) -> JobStatus {
        JobStatus::from_id(self.status_id)
            .unwrap_or_else(|| panic!("unknown job status id {}", self.status_id))
    }

    /// Decode the `kind` column, if recognized.
    pub fn kind(&self) -> Option<JobKind> {
        JobKind::parse(&self.kind)
    }

    /// Project this row into the wire snapshot shape.
    ///
    /// `final_review_id` is exposed only on completed jobs and `error` only
    /// on failed ones, regardless of what the columns hold.
    pub fn snapshot(&self) -> JobSnapshot {
        let status = self.status();
        JobSnapshot {
            job_id: self.id,
            status,
            progress: (self.progress > 0.0).then_some(self.progress),
            final_review_id: (status == JobStatus::Completed)
                .then_some(self.result_ref)
                .flatten(),
            error: (status == JobStatus::Failed)
                .then(|| self.error.clone())
                .flatten(),
            updated_at: self.updated_at,
        }
    }
}

/// DTO for submitting a new job via `POST /api/v1/jobs`.
#[derive(Debug, Deserialize)]
pub struct SubmitJob {
    pub kind: JobKind,
    pub industry_id: DbId,
    /// The cleaned review to classify; required for review_processing jobs.
    pub new_cleaned_id: Option<DbId>,
    /// Whether the classifier consults past reviews through the industry
    /// index.
    pub use_past_reviews: Option<bool>,
}

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    /// Filter by status ID (e.g. 1 = pending, 4 = failed).
    pub status_id: Option<StatusId>,
    /// Filter by job kind.
    pub kind: Option<JobKind>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus) -> Job {
        Job {
            id: 1,
            kind: "review_processing".into(),
            status_id: status.id(),
            owner_id: 10,
            industry_id: 20,
            new_cleaned_id: Some(30),
            use_past_reviews: true,
            progress: 0.0,
            result_ref: None,
            error: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn snapshot_hides_result_ref_unless_completed() {
        let mut row = job(JobStatus::Processing);
        row.result_ref = Some(99);

        assert_eq!(row.snapshot().final_review_id, None);

        row.status_id = JobStatus::Completed.id();
        assert_eq!(row.snapshot().final_review_id, Some(99));
    }

    #[test]
    fn snapshot_hides_error_unless_failed() {
        let mut row = job(JobStatus::Cancelled);
        row.error = Some("cancelled by user".into());

        assert_eq!(row.snapshot().error, None);

        row.status_id = JobStatus::Failed.id();
        assert_eq!(row.snapshot().error.as_deref(), Some("cancelled by user"));
    }

    #[test]
    fn snapshot_omits_zero_progress() {
        let mut row = job(JobStatus::Pending);
        assert_eq!(row.snapshot().progress, None);

        row.progress = 42.0;
        assert_eq!(row.snapshot().progress, Some(42.0));
    }
}
