//! Repository for the `industries` and `categories` tables.

use sqlx::PgPool;

use reviewhub_core::types::DbId;

use crate::models::industry::{Category, Industry};

/// Column list for `industries` queries.
const COLUMNS: &str = "id, name, owner_id, created_at, updated_at";

/// Provides CRUD operations for industries and their categories.
pub struct IndustryRepo;

impl IndustryRepo {
    /// Create an industry and seed its categories in one transaction.
    ///
    /// The `uq_industries_owner_name` index rejects duplicate names per
    /// owner (classified as a 409 by the API layer).
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        name: &str,
        categories: &[String],
    ) -> Result<Industry, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO industries (name, owner_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let industry = sqlx::query_as::<_, Industry>(&query)
            .bind(name)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        for category in categories {
            sqlx::query("INSERT INTO categories (name, industry_id) VALUES ($1, $2)")
                .bind(category)
                .bind(industry.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(industry)
    }

    /// Find an industry by ID, restricted to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Industry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM industries WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Industry>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's industries, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Industry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM industries WHERE owner_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Industry>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Categories of an industry, in name order.
    pub async fn categories(pool: &PgPool, industry_id: DbId) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, industry_id FROM categories WHERE industry_id = $1 ORDER BY name",
        )
        .bind(industry_id)
        .fetch_all(pool)
        .await
    }

    /// Delete an industry (categories, reviews, and jobs cascade).
    ///
    /// Returns `false` if the industry does not exist or belongs to
    /// another user.
    pub async fn delete(pool: &PgPool, id: DbId, owner_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM industries WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
