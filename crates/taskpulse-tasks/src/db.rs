use rusqlite::Connection;
use taskpulse_core::time::parse_timestamp;
use taskpulse_core::{TaskId, UserId};

use crate::error::Result;
use crate::types::Task;

/// Column list shared by every task SELECT / RETURNING clause.
pub(crate) const TASK_COLUMNS: &str =
    "id, user_id, title, deadline, completed, notified_2h, notified_1h, created_at";

/// Initialise the tasks table.
///
/// Requires the `users` table to exist already (foreign key target), so call
/// this after `taskpulse_users::db::init_db`.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title        TEXT    NOT NULL,
            deadline     TEXT,                        -- fixed-width UTC or NULL
            completed    INTEGER NOT NULL DEFAULT 0,
            notified_2h  INTEGER NOT NULL DEFAULT 0,
            notified_1h  INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT    NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks (user_id, created_at);

        -- Reminder polling: open tasks ordered by deadline
        CREATE INDEX IF NOT EXISTS idx_tasks_open_deadline
            ON tasks (deadline) WHERE completed = 0 AND deadline IS NOT NULL;
        ",
    )?;
    Ok(())
}

pub(crate) fn timestamp_column(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<chrono::DateTime<chrono::Utc>>> {
    let Some(raw) = row.get::<_, Option<String>>(idx)? else {
        return Ok(None);
    };
    parse_timestamp(&raw).map(Some).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("bad timestamp: {raw}").into(),
        )
    })
}

/// Map a row selected with TASK_COLUMNS to a Task.
pub(crate) fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let created_at = timestamp_column(row, 7)?.ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(7, "created_at".to_string(), rusqlite::types::Type::Null)
    })?;
    Ok(Task {
        id: TaskId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        title: row.get(2)?,
        deadline: timestamp_column(row, 3)?,
        completed: row.get(4)?,
        notified_2h: row.get(5)?,
        notified_1h: row.get(6)?,
        created_at,
    })
}
