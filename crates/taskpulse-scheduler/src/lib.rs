//! `taskpulse-scheduler`: deadline reminder engine.
//!
//! # Overview
//!
//! The [`engine::ReminderEngine`] wakes on a fixed interval and, for each
//! [`ReminderThreshold`](taskpulse_core::ReminderThreshold), selects the open
//! tasks whose deadline has entered `(now, now + threshold]`, notifies their
//! owners once, and records that on the task row.
//!
//! | Threshold  | Flag column   | Window              |
//! |------------|---------------|---------------------|
//! | `TwoHours` | `notified_2h` | `(now, now + 2h]`   |
//! | `OneHour`  | `notified_1h` | `(now, now + 1h]`   |
//!
//! Flags are set whatever the transport reports (at-most-once). State lives
//! only in those columns, so a restart neither loses nor repeats reminders
//! that were already committed.

pub mod engine;
pub mod error;
pub mod types;

pub use engine::ReminderEngine;
pub use error::{Result, SchedulerError};
pub use types::{CycleReport, ReminderSettings, ThresholdReport};
