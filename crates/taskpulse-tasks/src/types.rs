use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskpulse_core::{TaskId, UserId};

/// A persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Owning user; the only caller allowed to read or mutate this task.
    pub user_id: UserId,
    pub title: String,
    /// Absent means no reminder ever applies.
    pub deadline: Option<DateTime<Utc>>,
    pub completed: bool,
    /// Set once the 2-hour reminder was attempted. Never reset.
    pub notified_2h: bool,
    /// Set once the 1-hour reminder was attempted. Never reset.
    pub notified_1h: bool,
    pub created_at: DateTime<Utc>,
}

/// A task that has entered a reminder window, joined with what is needed to
/// notify its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderCandidate {
    pub task_id: TaskId,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub user_id: UserId,
    pub user_name: String,
    /// Owner's notification address; never blank.
    pub address: String,
}
