//! Reminder thresholds, shared between the task store's window queries and
//! the scheduler engine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A deadline threshold that earns exactly one reminder per task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderThreshold {
    TwoHours,
    OneHour,
}

impl ReminderThreshold {
    /// Evaluation order within a cycle.
    pub const ALL: [ReminderThreshold; 2] = [ReminderThreshold::TwoHours, ReminderThreshold::OneHour];

    /// Length of the window ahead of `now`.
    pub fn lead(self) -> Duration {
        match self {
            ReminderThreshold::TwoHours => Duration::hours(2),
            ReminderThreshold::OneHour => Duration::hours(1),
        }
    }

    /// The half-open window `(now, now + lead]`.
    pub fn window(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now, now + self.lead())
    }

    /// Whether `deadline` falls inside this threshold's window at `now`.
    pub fn contains(self, now: DateTime<Utc>, deadline: DateTime<Utc>) -> bool {
        let (start, end) = self.window(now);
        start < deadline && deadline <= end
    }

    /// Name of the per-task flag column this threshold owns.
    pub fn flag_column(self) -> &'static str {
        match self {
            ReminderThreshold::TwoHours => "notified_2h",
            ReminderThreshold::OneHour => "notified_1h",
        }
    }

    /// Reminder text sent to the task owner.
    pub fn message(self, user_name: &str, title: &str) -> String {
        match self {
            ReminderThreshold::TwoHours => format!(
                "⏰ *Heads up*\n\nHey {user_name}, your task *'{title}'* is due in *2 hours*!"
            ),
            ReminderThreshold::OneHour => format!(
                "⚠️ *Last call*\n\nHey {user_name}, *'{title}'* is due in just *1 hour*!"
            ),
        }
    }
}

impl fmt::Display for ReminderThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderThreshold::TwoHours => write!(f, "2h"),
            ReminderThreshold::OneHour => write!(f, "1h"),
        }
    }
}

/// Confirmation sent right after a task is created.
pub fn task_accepted_message(user_name: &str, title: &str) -> String {
    format!("✅ *Task saved*\n\nHey {user_name}, your new task *'{title}'* has been recorded. Good luck!")
}
