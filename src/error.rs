//! Error taxonomy for the arcade core

use thiserror::Error;

use crate::sim::GameId;

/// Errors surfaced by sessions, schedulers and the input router
#[derive(Debug, Error)]
pub enum ArcadeError {
    /// A step function failed; the loop has been stopped for good
    #[error("{game} step failed: {reason}")]
    SchedulerFault { game: GameId, reason: String },

    /// Underlying storage could not be read or written
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StorageError),

    /// A move targeted an occupied or out-of-range cell
    #[error("invalid move: cell {cell} is occupied or out of range")]
    InvalidMove { cell: usize },

    /// The intent buffer was full; the newest intent was dropped
    #[error("input buffer full ({capacity} intents), newest intent dropped")]
    InputOverflow { capacity: usize },
}

/// Failures reported by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed stored value: {0}")]
    Format(#[from] serde_json::Error),
}

/// Failure raised from inside a game's step function
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StepFault(pub String);

impl StepFault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
