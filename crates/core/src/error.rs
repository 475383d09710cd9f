use crate::job::JobStatus;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// An illegal job transition attempt. Callers treat this as a tolerated
    /// race (log and keep going), never as a user-facing failure.
    #[error("Invalid job transition: {from:?} -> {to:?}")]
    InvalidState { from: JobStatus, to: JobStatus },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
