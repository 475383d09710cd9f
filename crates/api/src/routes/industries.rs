//! Route definitions for the `/industries` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::industries;
use crate::state::AppState;

/// Routes mounted at `/industries`.
///
/// ```text
/// GET    /       -> list_industries
/// POST   /       -> create_industry
/// GET    /{id}   -> get_industry
/// DELETE /{id}   -> delete_industry
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(industries::list_industries).post(industries::create_industry),
        )
        .route(
            "/{id}",
            get(industries::get_industry).delete(industries::delete_industry),
        )
}
