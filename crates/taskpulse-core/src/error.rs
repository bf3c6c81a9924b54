use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskpulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required field is missing or malformed. Nothing was written.
    #[error("{0}")]
    Validation(String),

    /// Missing owner id, PIN mismatch or an owner id that matches no user.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskpulseError {
    /// Short error code string sent to HTTP clients next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            TaskpulseError::Config(_) => "CONFIG_ERROR",
            TaskpulseError::Validation(_) => "VALIDATION_ERROR",
            TaskpulseError::Unauthorized(_) => "UNAUTHORIZED",
            TaskpulseError::NotFound { .. } => "NOT_FOUND",
            TaskpulseError::Database(_) => "DATABASE_ERROR",
            TaskpulseError::Serialization(_) => "SERIALIZATION_ERROR",
            TaskpulseError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        TaskpulseError::NotFound { what: what.into() }
    }
}

pub type Result<T> = std::result::Result<T, TaskpulseError>;
