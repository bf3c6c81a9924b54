use taskpulse_tasks::TaskError;
use thiserror::Error;

/// Errors that can end a single scheduler cycle. None of them stop the loop.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Selecting reminder candidates failed; nothing was sent.
    #[error("Candidate query failed: {0}")]
    Select(#[source] TaskError),

    /// Reminders were attempted but their flags could not be committed.
    #[error("Failed to record {pending} reminder flag(s): {source}")]
    FlagCommit {
        pending: usize,
        #[source]
        source: TaskError,
    },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
