pub mod health;
pub mod industries;
pub mod jobs;
pub mod reviews;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws/jobs/{id}                 per-job status stream (token query param)
///
/// /jobs                         list, submit (GET, POST)
/// /jobs/active                  caller's active job (GET)
/// /jobs/{id}                    snapshot by id -- polling fallback (GET)
/// /jobs/{id}/cancel             request cancellation (POST)
///
/// /industries                   list, create (GET, POST)
/// /industries/{id}              get, delete (GET, DELETE)
///
/// /reviews                      list (GET)
/// /reviews/{id}                 get (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws/jobs/{id}", get(ws::job_ws_handler))
        .nest("/jobs", jobs::router())
        .nest("/industries", industries::router())
        .nest("/reviews", reviews::router())
}
