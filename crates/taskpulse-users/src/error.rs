use taskpulse_core::UserId;
use thiserror::Error;

/// All user-layer errors. Kept separate from TaskpulseError so the gateway
/// can map them to HTTP statuses without coupling layers.
#[derive(Debug, Error)]
pub enum UserError {
    /// Name or PIN missing. Nothing was written.
    #[error("{0}")]
    Validation(String),

    #[error("Incorrect PIN")]
    InvalidPin,

    #[error("User not found: {0}")]
    NotFound(UserId),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, UserError>;
