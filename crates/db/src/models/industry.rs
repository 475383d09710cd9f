//! Industry and category models.
//!
//! An industry is a per-user taxonomy scope: its categories are the labels
//! the classification pipeline assigns, and jobs are scoped to it.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use reviewhub_core::types::{DbId, Timestamp};

/// A row from the `industries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Industry {
    pub id: DbId,
    pub name: String,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub industry_id: DbId,
}

/// An industry together with its category names, as returned by the API.
#[derive(Debug, Serialize)]
pub struct IndustryWithCategories {
    #[serde(flatten)]
    pub industry: Industry,
    pub categories: Vec<Category>,
}

/// DTO for `POST /api/v1/industries`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateIndustry {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Category names seeded with the industry.
    #[validate(length(min = 1))]
    pub categories: Vec<String>,
}
