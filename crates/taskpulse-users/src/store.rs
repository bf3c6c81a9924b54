use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use taskpulse_core::time::format_timestamp;
use taskpulse_core::UserId;

use crate::db::{row_to_user, USER_COLUMNS};
use crate::error::{Result, UserError};
use crate::types::User;

/// Insert a brand-new user row and return it with its assigned id.
pub fn create_user(conn: &Connection, name: &str, pin: &str, address: Option<&str>) -> Result<User> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO users (name, pin, phone_number, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![name, pin, address, format_timestamp(now)],
    )?;
    let id = UserId(conn.last_insert_rowid());
    get_user(conn, id)?.ok_or(UserError::NotFound(id))
}

/// Load a user by primary key. Returns None instead of an error when absent
/// so callers decide whether missing is exceptional in their context.
pub fn get_user(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id.0], row_to_user).optional()?)
}

pub fn find_user_by_name(conn: &Connection, name: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE name = ?1");
    Ok(conn.query_row(&sql, params![name], row_to_user).optional()?)
}

/// Overwrite the notification address. Only this column is touched.
pub fn update_address(conn: &Connection, id: UserId, address: &str) -> Result<()> {
    let n = conn.execute(
        "UPDATE users SET phone_number = ?1 WHERE id = ?2",
        params![address, id.0],
    )?;
    if n == 0 {
        return Err(UserError::NotFound(id));
    }
    Ok(())
}
