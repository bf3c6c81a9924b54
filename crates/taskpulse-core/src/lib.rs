//! Shared building blocks for every Taskpulse crate: configuration, the
//! top-level error type, identifiers, timestamp encoding and the reminder
//! thresholds understood by both the scheduler and the task store.

pub mod config;
pub mod error;
pub mod reminder;
pub mod time;
pub mod types;

pub use error::{Result, TaskpulseError};
pub use reminder::ReminderThreshold;
pub use types::{TaskId, UserId};
