//! Handlers for the `/jobs` resource.
//!
//! All endpoints require authentication via [`AuthUser`]. A user can only
//! see their own jobs; a foreign job id behaves exactly like a missing
//! one.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use reviewhub_core::error::CoreError;
use reviewhub_core::job::{JobKind, JobStatus};
use reviewhub_core::snapshot::JobSnapshot;
use reviewhub_core::types::DbId;
use reviewhub_db::models::job::{Job, JobListQuery, SubmitJob};
use reviewhub_db::repositories::{IndustryRepo, JobRepo, ReviewRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a job by ID and verify the caller owns it.
///
/// Unknown and foreign jobs are indistinguishable to the caller: both
/// produce `NotFound`.
async fn find_and_authorize(pool: &sqlx::PgPool, job_id: DbId, auth: &AuthUser) -> AppResult<Job> {
    let job = JobRepo::find_by_id(pool, job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))?;

    if job.owner_id != auth.user_id {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }));
    }

    Ok(job)
}

/// `POST /jobs` response body.
#[derive(Debug, Serialize)]
pub struct SubmittedJob {
    pub job_id: DbId,
    pub status: JobStatus,
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs
///
/// Validate the referenced resources, create the job record, and hand it
/// to the background runner. Returns 201 with `{ job_id, status }`
/// immediately; progress is observed over the WebSocket stream or by
/// polling. 409 if an active job already exists for the same
/// (kind, industry) scope.
pub async fn submit_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SubmitJob>,
) -> AppResult<impl IntoResponse> {
    IndustryRepo::find_by_id(&state.pool, input.industry_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Industry",
            id: input.industry_id,
        }))?;

    if input.kind == JobKind::ReviewProcessing {
        let cleaned_id = input.new_cleaned_id.ok_or_else(|| {
            AppError::BadRequest("review_processing jobs require new_cleaned_id".into())
        })?;
        ReviewRepo::find_by_id(&state.pool, cleaned_id, auth.user_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Review",
                id: cleaned_id,
            }))?;
    }

    let job = state.tracker.create(auth.user_id, &input).await?;

    state.runner.spawn(job.clone()).await?;

    tracing::info!(
        job_id = job.id,
        kind = %job.kind,
        user_id = auth.user_id,
        "Job submitted",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmittedJob {
                job_id: job.id,
                status: job.status(),
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// List / active
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs
///
/// List the caller's jobs, newest first. Supports optional `status_id`,
/// `kind`, `limit`, and `offset` query parameters.
pub async fn list_jobs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> AppResult<impl IntoResponse> {
    let jobs = JobRepo::list_by_owner(&state.pool, auth.user_id, &params).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/jobs/active
///
/// The caller's currently active (pending/processing) job, or `null`.
/// The UI uses this to re-attach to a job after a page reload.
pub async fn active_job(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let snapshot: Option<JobSnapshot> = JobRepo::find_active_for_owner(&state.pool, auth.user_id)
        .await?
        .map(|job| job.snapshot());
    Ok(Json(DataResponse { data: snapshot }))
}

// ---------------------------------------------------------------------------
// Get (polling fallback)
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{id}
///
/// The current snapshot of a job, in the same shape the WebSocket stream
/// pushes. Clients poll this when the real-time channel is unavailable.
pub async fn get_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = find_and_authorize(&state.pool, job_id, &auth).await?;
    Ok(Json(DataResponse {
        data: job.snapshot(),
    }))
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs/{id}/cancel
///
/// Request cancellation. Returns 202 with the snapshot as of the request:
/// a pending job shows up cancelled already, a processing one still shows
/// processing until the worker acknowledges — the actual state change is
/// observed asynchronously. A job already in a terminal state is an
/// accepted no-op.
pub async fn cancel_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, job_id, &auth).await?;

    let job = match state.tracker.cancel_request(job_id).await {
        Ok(job) => job,
        // Terminal already: the request raced a completion. Acknowledge
        // with the current state instead of failing.
        Err(AppError::Core(CoreError::InvalidState { .. })) => {
            find_and_authorize(&state.pool, job_id, &auth).await?
        }
        Err(e) => return Err(e),
    };

    tracing::info!(job_id, user_id = auth.user_id, "Job cancellation requested");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: job.snapshot(),
        }),
    ))
}
