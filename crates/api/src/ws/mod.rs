//! WebSocket infrastructure for real-time job tracking.
//!
//! Provides the per-job subscriber hub, heartbeat monitoring, and the HTTP
//! upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod hub;

pub use handler::job_ws_handler;
pub use heartbeat::start_heartbeat;
pub use hub::{JobHub, Subscription};
