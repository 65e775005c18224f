//! Error types for the timer service.

use thiserror::Error;

/// Errors surfaced by timer service operations.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The reserved zero id was passed where a live timer id is required.
    #[error("invalid timer id: 0 is reserved")]
    InvalidParameter,

    /// No live timer matches the given id, or it was already canceled.
    #[error("timer not found")]
    NotFound,

    /// The dispatch worker thread could not be spawned.
    #[error("failed to spawn timer worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// Service configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// A specialized `Result` type for timer service operations.
pub type TimerResult<T> = std::result::Result<T, TimerError>;
