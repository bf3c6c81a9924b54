use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use taskpulse_core::time::format_timestamp;
use taskpulse_core::{ReminderThreshold, TaskId, UserId};
use tracing::debug;

use crate::db::timestamp_column;
use crate::error::Result;
use crate::types::ReminderCandidate;

/// Tasks whose deadline lies in `(now, now + threshold]` and that still owe
/// this threshold's reminder.
///
/// Excludes completed tasks, tasks already flagged for `threshold`, tasks
/// without a deadline and tasks whose owner has no usable address.
pub fn due_for_reminder(
    conn: &Connection,
    threshold: ReminderThreshold,
    now: DateTime<Utc>,
) -> Result<Vec<ReminderCandidate>> {
    let (start, end) = threshold.window(now);
    let flag = threshold.flag_column();
    let sql = format!(
        "SELECT t.id, t.title, t.deadline, u.id, u.name, TRIM(u.phone_number)
         FROM tasks t
         JOIN users u ON t.user_id = u.id
         WHERE t.completed = 0
           AND t.{flag} = 0
           AND t.deadline IS NOT NULL
           AND t.deadline > ?1
           AND t.deadline <= ?2
           AND u.phone_number IS NOT NULL
           AND TRIM(u.phone_number) <> ''
         ORDER BY t.deadline, t.id"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(
            params![format_timestamp(start), format_timestamp(end)],
            |row| {
                // NOT NULL is guaranteed by the WHERE clause.
                let deadline = timestamp_column(row, 2)?.ok_or_else(|| {
                    rusqlite::Error::InvalidColumnType(
                        2,
                        "deadline".to_string(),
                        rusqlite::types::Type::Null,
                    )
                })?;
                Ok(ReminderCandidate {
                    task_id: TaskId(row.get(0)?),
                    title: row.get(1)?,
                    deadline,
                    user_id: UserId(row.get(3)?),
                    user_name: row.get(4)?,
                    address: row.get(5)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(%threshold, count = rows.len(), "reminder candidates selected");
    Ok(rows)
}

/// Flip `threshold`'s flag for every task in `ids`.
///
/// Writes only the flag column and only where it is still false, so the call
/// is idempotent and never touches `completed`. Returns how many rows
/// actually changed.
pub fn mark_notified(conn: &Connection, threshold: ReminderThreshold, ids: &[TaskId]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let flag = threshold.flag_column();
    let sql = format!("UPDATE tasks SET {flag} = 1 WHERE id = ?1 AND {flag} = 0");
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut changed = 0;
    for id in ids {
        changed += stmt.execute(params![id.0])?;
    }
    Ok(changed)
}

/// Apply a whole cycle's worth of flag updates in a single transaction.
///
/// Either every listed flag is set or none is.
pub fn commit_reminder_flags(
    conn: &mut Connection,
    marks: &[(ReminderThreshold, Vec<TaskId>)],
) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    for (threshold, ids) in marks {
        changed += mark_notified(&tx, *threshold, ids)?;
    }
    tx.commit()?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        taskpulse_users::db::init_db(&conn).unwrap();
        crate::db::init_db(&conn).unwrap();
        conn
    }

    fn user(conn: &Connection, name: &str, address: Option<&str>) -> UserId {
        taskpulse_users::store::create_user(conn, name, "1", address)
            .unwrap()
            .id
    }

    fn task(conn: &Connection, owner: UserId, deadline: Option<DateTime<Utc>>) -> TaskId {
        conn.execute(
            "INSERT INTO tasks (user_id, title, deadline, created_at) VALUES (?1, 'task', ?2, ?3)",
            params![owner.0, deadline.map(format_timestamp), format_timestamp(now())],
        )
        .unwrap();
        TaskId(conn.last_insert_rowid())
    }

    fn due_ids(conn: &Connection, threshold: ReminderThreshold) -> Vec<TaskId> {
        due_for_reminder(conn, threshold, now())
            .unwrap()
            .into_iter()
            .map(|c| c.task_id)
            .collect()
    }

    #[test]
    fn window_bounds_are_exclusive_then_inclusive() {
        let conn = setup();
        let owner = user(&conn, "ada", Some("+1"));
        let at_now = task(&conn, owner, Some(now()));
        let at_edge = task(&conn, owner, Some(now() + Duration::hours(2)));
        let past_edge = task(&conn, owner, Some(now() + Duration::hours(2) + Duration::seconds(1)));
        let overdue = task(&conn, owner, Some(now() - Duration::minutes(5)));

        let due = due_ids(&conn, ReminderThreshold::TwoHours);
        assert_eq!(due, vec![at_edge]);
        for id in [at_now, past_edge, overdue] {
            assert!(!due.contains(&id));
        }
    }

    #[test]
    fn skips_completed_flagged_deadline_less_and_addressless() {
        let conn = setup();
        let ada = user(&conn, "ada", Some("+1"));
        let blank = user(&conn, "blank", Some("  "));
        let none = user(&conn, "none", None);
        let soon = Some(now() + Duration::minutes(30));

        let eligible = task(&conn, ada, soon);
        let completed = task(&conn, ada, soon);
        conn.execute("UPDATE tasks SET completed = 1 WHERE id = ?1", params![completed.0])
            .unwrap();
        let flagged = task(&conn, ada, soon);
        conn.execute("UPDATE tasks SET notified_1h = 1 WHERE id = ?1", params![flagged.0])
            .unwrap();
        task(&conn, ada, None);
        task(&conn, blank, soon);
        task(&conn, none, soon);

        assert_eq!(due_ids(&conn, ReminderThreshold::OneHour), vec![eligible]);
        // notified_1h does not affect the 2h threshold.
        assert_eq!(
            due_ids(&conn, ReminderThreshold::TwoHours),
            vec![eligible, flagged]
        );
    }

    #[test]
    fn candidate_carries_owner_details() {
        let conn = setup();
        let ada = user(&conn, "ada", Some(" +15550001 "));
        let id = task(&conn, ada, Some(now() + Duration::minutes(90)));
        let due = due_for_reminder(&conn, ReminderThreshold::TwoHours, now()).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].task_id, id);
        assert_eq!(due[0].user_name, "ada");
        assert_eq!(due[0].address, "+15550001");
    }

    #[test]
    fn mark_notified_is_idempotent_and_column_scoped() {
        let conn = setup();
        let ada = user(&conn, "ada", Some("+1"));
        let id = task(&conn, ada, Some(now() + Duration::minutes(30)));

        assert_eq!(mark_notified(&conn, ReminderThreshold::OneHour, &[id]).unwrap(), 1);
        assert_eq!(mark_notified(&conn, ReminderThreshold::OneHour, &[id]).unwrap(), 0);

        let (n2, n1, done): (bool, bool, bool) = conn
            .query_row(
                "SELECT notified_2h, notified_1h, completed FROM tasks WHERE id = ?1",
                params![id.0],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert!(!n2 && n1 && !done);
    }

    #[test]
    fn mark_notified_with_no_ids_is_a_no_op() {
        let conn = setup();
        assert_eq!(mark_notified(&conn, ReminderThreshold::TwoHours, &[]).unwrap(), 0);
    }

    #[test]
    fn commit_sets_both_thresholds_together() {
        let mut conn = setup();
        let ada = user(&conn, "ada", Some("+1"));
        let a = task(&conn, ada, Some(now() + Duration::minutes(30)));
        let b = task(&conn, ada, Some(now() + Duration::minutes(90)));

        let marks = vec![
            (ReminderThreshold::TwoHours, vec![a, b]),
            (ReminderThreshold::OneHour, vec![a]),
        ];
        assert_eq!(commit_reminder_flags(&mut conn, &marks).unwrap(), 3);
        assert!(due_ids(&conn, ReminderThreshold::TwoHours).is_empty());
        assert!(due_ids(&conn, ReminderThreshold::OneHour).is_empty());
    }
}
