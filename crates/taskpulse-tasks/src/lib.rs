//! `taskpulse-tasks`: owner-scoped task storage.
//!
//! The [`repository::TaskRepository`] serves the HTTP API; the free functions
//! in [`reminders`] are the scheduler's contract with the same table: select
//! the tasks inside a reminder window, then flip the matching flag column.

pub mod db;
pub mod error;
pub mod reminders;
pub mod repository;
pub mod types;

pub use error::{Result, TaskError};
pub use repository::TaskRepository;
pub use types::{ReminderCandidate, Task};
