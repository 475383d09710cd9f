//! Domain types shared across the Reviewhub workspace.
//!
//! This crate is I/O-free: the job state machine, the snapshot wire types,
//! the error taxonomy, and the cooperative cancellation registry all live
//! here so both the database layer and the HTTP layer agree on them.

pub mod cancellation;
pub mod error;
pub mod job;
pub mod snapshot;
pub mod types;
