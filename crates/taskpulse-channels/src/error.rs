use thiserror::Error;

/// Errors that can occur while handing a message to a transport.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The request never reached the remote service.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The remote service answered with a non-success status.
    #[error("Rejected by provider ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// An operation exceeded its time limit.
    #[error("Operation timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The transport configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for ChannelError {
    fn from(e: reqwest::Error) -> Self {
        ChannelError::SendFailed(e.to_string())
    }
}
