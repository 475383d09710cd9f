use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::{JobRunner, JobTracker};
use crate::ws::JobHub;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: reviewhub_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-job WebSocket subscriber hub.
    pub hub: Arc<JobHub>,
    /// The job lifecycle tracker (all status transitions go through it).
    pub tracker: Arc<JobTracker>,
    /// Spawns background job tasks.
    pub runner: Arc<JobRunner>,
}
