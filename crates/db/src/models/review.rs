//! Review file metadata models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reviewhub_core::types::{DbId, Timestamp};

/// Processing stage of a review file. Files derive from one another:
/// combined -> cleaned -> final.
pub mod stage {
    pub const COMBINED: &str = "combined";
    pub const CLEANED: &str = "cleaned";
    pub const FINAL: &str = "final";
}

/// A row from the `reviews` table. The file itself lives on disk;
/// this row is the pointer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub display_name: String,
    pub industry_id: DbId,
    pub stage: String,
    pub file_path: String,
    pub parent_id: Option<DbId>,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields for inserting a new review row.
#[derive(Debug, Clone)]
pub struct NewReview<'a> {
    pub display_name: &'a str,
    pub industry_id: DbId,
    pub stage: &'a str,
    pub file_path: &'a str,
    pub parent_id: Option<DbId>,
    pub owner_id: DbId,
}

/// Query parameters for `GET /api/v1/reviews`.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub industry_id: Option<DbId>,
    pub stage: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
