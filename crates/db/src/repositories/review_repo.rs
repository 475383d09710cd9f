//! Repository for the `reviews` table.

use sqlx::PgPool;

use reviewhub_core::types::DbId;

use crate::models::review::{NewReview, Review, ReviewListQuery};

/// Column list for `reviews` queries.
const COLUMNS: &str = "\
    id, display_name, industry_id, stage, file_path, parent_id, owner_id, \
    created_at, updated_at";

/// Maximum page size for review listing.
const MAX_LIMIT: i64 = 200;

/// Default page size for review listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides persistence for review file metadata.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a new review row.
    pub async fn create(pool: &PgPool, input: &NewReview<'_>) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (display_name, industry_id, stage, file_path, parent_id, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(input.display_name)
            .bind(input.industry_id)
            .bind(input.stage)
            .bind(input.file_path)
            .bind(input.parent_id)
            .bind(input.owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find a review by ID, restricted to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Count reviews belonging to an industry.
    pub async fn count_by_industry(pool: &PgPool, industry_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE industry_id = $1")
            .bind(industry_id)
            .fetch_one(pool)
            .await
    }

    /// List a user's reviews with optional industry/stage filters.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
        params: &ReviewListQuery,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let mut conditions = vec!["owner_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if params.industry_id.is_some() {
            conditions.push(format!("industry_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.stage.is_some() {
            conditions.push(format!("stage = ${bind_idx}"));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM reviews \
             WHERE {} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Review>(&query).bind(owner_id);
        if let Some(industry_id) = params.industry_id {
            q = q.bind(industry_id);
        }
        if let Some(stage) = &params.stage {
            q = q.bind(stage);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }
}
