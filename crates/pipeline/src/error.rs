use std::io;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The executor observed the cancellation signal at a checkpoint and
    /// wound down. Translated into an acknowledged cancellation, not a
    /// failure.
    #[error("job cancelled")]
    Cancelled,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Failed(String),
}
