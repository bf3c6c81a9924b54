use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use taskpulse_core::time::format_timestamp;
use taskpulse_core::{TaskId, UserId};
use tracing::{debug, info, instrument};

use crate::db::{row_to_task, TASK_COLUMNS};
use crate::error::{Result, TaskError};
use crate::types::Task;

/// Owner-scoped CRUD over the `tasks` table.
///
/// Every by-id operation filters on `user_id` as well, so a task owned by
/// someone else is indistinguishable from a missing one.
pub struct TaskRepository {
    db: Arc<Mutex<Connection>>,
}

impl TaskRepository {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// Insert a new task for `owner`. Flags start false.
    #[instrument(skip(self, title), fields(owner = %owner))]
    pub fn create(
        &self,
        owner: UserId,
        title: &str,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::Validation("Title is required".to_string()));
        }

        let db = self.conn();
        let owner_exists = db
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![owner.0], |_| Ok(()))
            .optional()?
            .is_some();
        if !owner_exists {
            return Err(TaskError::UnknownOwner(owner));
        }

        let sql = format!(
            "INSERT INTO tasks (user_id, title, deadline, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {TASK_COLUMNS}"
        );
        let task = db.query_row(
            &sql,
            params![
                owner.0,
                title,
                deadline.map(format_timestamp),
                format_timestamp(Utc::now())
            ],
            row_to_task,
        )?;
        info!(task_id = %task.id, has_deadline = task.deadline.is_some(), "task created");
        Ok(task)
    }

    /// All tasks of `owner`, newest first.
    #[instrument(skip(self), fields(owner = %owner))]
    pub fn list(&self, owner: UserId) -> Result<Vec<Task>> {
        let db = self.conn();
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = db.prepare(&sql)?;
        let tasks = stmt
            .query_map(params![owner.0], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    pub fn get(&self, id: TaskId, owner: UserId) -> Result<Task> {
        let db = self.conn();
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2");
        db.query_row(&sql, params![id.0, owner.0], row_to_task)
            .optional()?
            .ok_or(TaskError::NotFound(id))
    }

    /// Set the completion flag. Only the `completed` column is written, so a
    /// concurrent reminder flag update is never clobbered.
    #[instrument(skip(self), fields(task_id = %id, owner = %owner))]
    pub fn set_completed(&self, id: TaskId, owner: UserId, completed: bool) -> Result<Task> {
        let db = self.conn();
        let sql = format!(
            "UPDATE tasks SET completed = ?1
             WHERE id = ?2 AND user_id = ?3
             RETURNING {TASK_COLUMNS}"
        );
        let task = db
            .query_row(&sql, params![completed, id.0, owner.0], row_to_task)
            .optional()?
            .ok_or(TaskError::NotFound(id))?;
        debug!(completed, "task completion updated");
        Ok(task)
    }

    #[instrument(skip(self), fields(task_id = %id, owner = %owner))]
    pub fn delete(&self, id: TaskId, owner: UserId) -> Result<()> {
        let db = self.conn();
        let n = db.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![id.0, owner.0],
        )?;
        if n == 0 {
            return Err(TaskError::NotFound(id));
        }
        info!("task deleted");
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
