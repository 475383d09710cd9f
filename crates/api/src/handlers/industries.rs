//! Handlers for the `/industries` resource.
//!
//! All endpoints require authentication via [`AuthUser`]; every query is
//! scoped to the caller's rows.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use reviewhub_core::error::CoreError;
use reviewhub_core::types::DbId;
use reviewhub_db::models::industry::{CreateIndustry, IndustryWithCategories};
use reviewhub_db::repositories::IndustryRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/industries
///
/// Create an industry with its category taxonomy. Returns 201 with the
/// industry and its categories; 409 on a duplicate name.
pub async fn create_industry(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateIndustry>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let industry =
        IndustryRepo::create(&state.pool, auth.user_id, &input.name, &input.categories).await?;
    let categories = IndustryRepo::categories(&state.pool, industry.id).await?;

    tracing::info!(
        industry_id = industry.id,
        name = %industry.name,
        user_id = auth.user_id,
        "Industry created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: IndustryWithCategories {
                industry,
                categories,
            },
        }),
    ))
}

/// GET /api/v1/industries
///
/// List the caller's industries with their categories.
pub async fn list_industries(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let industries = IndustryRepo::list_by_owner(&state.pool, auth.user_id).await?;

    let mut result = Vec::with_capacity(industries.len());
    for industry in industries {
        let categories = IndustryRepo::categories(&state.pool, industry.id).await?;
        result.push(IndustryWithCategories {
            industry,
            categories,
        });
    }

    Ok(Json(DataResponse { data: result }))
}

/// GET /api/v1/industries/{id}
pub async fn get_industry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let industry = IndustryRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Industry",
            id,
        }))?;
    let categories = IndustryRepo::categories(&state.pool, industry.id).await?;

    Ok(Json(DataResponse {
        data: IndustryWithCategories {
            industry,
            categories,
        },
    }))
}

/// DELETE /api/v1/industries/{id}
///
/// Delete an industry; its categories, reviews, and jobs cascade.
/// Returns 204.
pub async fn delete_industry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = IndustryRepo::delete(&state.pool, id, auth.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Industry",
            id,
        }));
    }

    tracing::info!(industry_id = id, user_id = auth.user_id, "Industry deleted");

    Ok(StatusCode::NO_CONTENT)
}
