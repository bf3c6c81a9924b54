use taskpulse_core::{TaskId, UserId};
use thiserror::Error;

/// Errors that can occur during task operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A required field is missing or empty. Nothing was written.
    #[error("{0}")]
    Validation(String),

    /// No task with this id belongs to the caller. Also returned for tasks
    /// owned by someone else so their existence is not leaked.
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    /// The owner id matches no user row.
    #[error("Unknown user: {0}")]
    UnknownOwner(UserId),

    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;
