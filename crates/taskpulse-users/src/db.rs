use rusqlite::Connection;
use taskpulse_core::time::parse_timestamp;
use taskpulse_core::UserId;

use crate::error::Result;
use crate::types::User;

/// Column list shared by every user SELECT so `row_to_user` stays in sync.
pub(crate) const USER_COLUMNS: &str = "id, name, pin, phone_number, created_at";

/// Map a SELECT row (column order from USER_COLUMNS) to a User.
pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_raw: String = row.get(4)?;
    let created_at = parse_timestamp(&created_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("bad created_at: {created_raw}").into(),
        )
    })?;
    Ok(User {
        id: UserId(row.get(0)?),
        name: row.get(1)?,
        pin: row.get(2)?,
        address: row.get(3)?,
        created_at,
    })
}

/// Initialise the users table. Safe to call on every startup:
/// CREATE IF NOT EXISTS means it's idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT    NOT NULL UNIQUE,
            pin           TEXT    NOT NULL,
            phone_number  TEXT,
            created_at    TEXT    NOT NULL
        );",
    )?;
    Ok(())
}
