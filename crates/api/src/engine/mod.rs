//! Job execution engine.
//!
//! [`tracker::JobTracker`] owns every status transition: it applies the
//! state machine against the store and pushes the resulting snapshot to
//! the WebSocket hub. [`runner::JobRunner`] spawns the background task
//! that executes a job and reports back through the tracker.

pub mod runner;
pub mod tracker;

pub use runner::JobRunner;
pub use tracker::JobTracker;
