//! WebSocket upgrade handler for per-job status streams.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use reviewhub_core::error::CoreError;
use reviewhub_core::types::DbId;
use reviewhub_db::repositories::JobRepo;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for the WebSocket upgrade request.
///
/// Browsers cannot set headers on WebSocket handshakes, so the access
/// token rides in the query string.
#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// GET /api/v1/ws/jobs/{id}
///
/// Authenticates the token, verifies the job belongs to the caller
/// (unknown and foreign jobs are indistinguishable: both 404), then
/// upgrades. After the upgrade the client immediately receives the
/// current snapshot, followed by a push on every transition; a terminal
/// snapshot is followed by a Close frame.
pub async fn job_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Query(query): Query<WsAuthQuery>,
) -> AppResult<Response> {
    let claims = validate_token(&query.token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    let job = JobRepo::find_by_id(&state.pool, job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))?;

    if job.owner_id != claims.sub {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }));
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, job_id)))
}

/// Manage a single job-status connection after upgrade.
///
/// Subscribes before reading the initial snapshot so no transition can
/// fall between the two (a duplicate snapshot is possible instead, which
/// clients tolerate).
async fn handle_socket(socket: WebSocket, state: AppState, job_id: DbId) {
    tracing::info!(job_id, "Job WebSocket connected");

    let (subscription, mut rx) = state.hub.subscribe(job_id).await;

    let initial = match JobRepo::find_by_id(&state.pool, job_id).await {
        Ok(Some(job)) => job.snapshot(),
        Ok(None) | Err(_) => {
            tracing::warn!(job_id, "Job disappeared before initial snapshot");
            state.hub.unsubscribe(subscription).await;
            return;
        }
    };

    let (mut sink, mut stream) = socket.split();

    let payload = match serde_json::to_string(&initial) {
        Ok(json) => Message::Text(json.into()),
        Err(e) => {
            tracing::error!(job_id, error = %e, "Failed to serialize initial snapshot");
            state.hub.unsubscribe(subscription).await;
            return;
        }
    };
    if sink.send(payload).await.is_err() {
        state.hub.unsubscribe(subscription).await;
        return;
    }

    // A job that was already terminal gets exactly the one snapshot.
    if initial.status.is_terminal() {
        let _ = sink.send(Message::Close(None)).await;
        state.hub.unsubscribe(subscription).await;
        tracing::info!(job_id, "Job WebSocket closed (already terminal)");
        return;
    }

    // Sender task: forward hub messages to the WebSocket sink.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let is_close = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(job_id, "Job WebSocket sink closed");
                break;
            }
            if is_close {
                break;
            }
        }
    });

    // Receiver loop: the client rarely sends anything; watch for
    // disconnect and Pong.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(job_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(job_id, error = %e, "Job WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove the subscription and stop the sender task.
    state.hub.unsubscribe(subscription).await;
    send_task.abort();
    tracing::info!(job_id, "Job WebSocket disconnected");
}
