//! Handlers for the `/reviews` resource.
//!
//! Review rows are metadata pointers created by the upload/processing
//! pipeline; the API exposes read access so clients can pick a cleaned
//! file for a job and fetch the final artifact reference afterwards.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use reviewhub_core::error::CoreError;
use reviewhub_core::types::DbId;
use reviewhub_db::models::review::ReviewListQuery;
use reviewhub_db::repositories::ReviewRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/reviews
///
/// List the caller's reviews. Supports optional `industry_id`, `stage`,
/// `limit`, and `offset` query parameters.
pub async fn list_reviews(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ReviewListQuery>,
) -> AppResult<impl IntoResponse> {
    let reviews = ReviewRepo::list_by_owner(&state.pool, auth.user_id, &params).await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/reviews/{id}
pub async fn get_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let review = ReviewRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Review",
            id,
        }))?;
    Ok(Json(DataResponse { data: review }))
}
