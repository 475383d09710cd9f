//! Repository for the `indexes` table.

use sqlx::PgPool;

use reviewhub_core::types::DbId;

use crate::models::index::IndustryIndex;

/// Column list for `indexes` queries.
const COLUMNS: &str = "id, industry_id, owner_id, reviews_included, created_at, updated_at";

/// Provides persistence for per-industry index state.
pub struct IndexRepo;

impl IndexRepo {
    /// Insert or refresh the index row for an industry.
    pub async fn upsert(
        pool: &PgPool,
        industry_id: DbId,
        owner_id: DbId,
        reviews_included: i64,
    ) -> Result<IndustryIndex, sqlx::Error> {
        let query = format!(
            "INSERT INTO indexes (industry_id, owner_id, reviews_included) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (industry_id) DO UPDATE \
                 SET reviews_included = EXCLUDED.reviews_included, updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IndustryIndex>(&query)
            .bind(industry_id)
            .bind(owner_id)
            .bind(reviews_included)
            .fetch_one(pool)
            .await
    }

    /// The index row for an industry, if one has been built.
    pub async fn find_by_industry(
        pool: &PgPool,
        industry_id: DbId,
    ) -> Result<Option<IndustryIndex>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM indexes WHERE industry_id = $1");
        sqlx::query_as::<_, IndustryIndex>(&query)
            .bind(industry_id)
            .fetch_optional(pool)
            .await
    }
}
