//! Per-industry review index state.

use serde::Serialize;
use sqlx::FromRow;

use reviewhub_core::types::{DbId, Timestamp};

/// A row from the `indexes` table: one per industry, tracking how many
/// reviews the industry's index currently covers. Rebuilt by index_update
/// jobs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IndustryIndex {
    pub id: DbId,
    pub industry_id: DbId,
    pub owner_id: DbId,
    pub reviews_included: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
