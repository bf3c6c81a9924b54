//! Task endpoints under `/api/tasks`.
//!
//! Every request carries the caller's `user_id` (query string for GET and
//! DELETE, JSON body otherwise). A missing id is 401; a task owned by someone
//! else is 404, exactly as if it did not exist.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use taskpulse_channels::dispatch;
use taskpulse_core::reminder::task_accepted_message;
use taskpulse_core::time::parse_timestamp;
use taskpulse_core::{TaskId, UserId};
use taskpulse_scheduler::ReminderSettings;
use taskpulse_tasks::Task;
use tracing::{debug, warn};

use super::error::{ApiError, ApiResult};
use super::extract::{owner_id, ApiJson, ApiPath, ApiQuery};
use crate::app::AppState;

#[derive(Deserialize)]
pub struct OwnerQuery {
    #[serde(default, deserialize_with = "owner_id")]
    pub user_id: Option<UserId>,
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default, deserialize_with = "owner_id")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub title: String,
    /// RFC 3339, or a naive `datetime-local` value taken as UTC.
    #[serde(default)]
    pub deadline: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "owner_id")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub completed: Option<bool>,
}

fn require_owner(user_id: Option<UserId>) -> ApiResult<UserId> {
    user_id.ok_or_else(|| ApiError::unauthorized("user_id is required"))
}

fn parse_deadline(raw: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| ApiError::validation(format!("Invalid deadline: {s}"))),
    }
}

/// GET /api/tasks?user_id=
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<OwnerQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let owner = require_owner(query.user_id)?;
    Ok(Json(state.tasks.list(owner)?))
}

/// POST /api/tasks
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let owner = require_owner(req.user_id)?;
    let deadline = parse_deadline(req.deadline.as_deref())?;
    let task = state.tasks.create(owner, &req.title, deadline)?;

    notify_task_accepted(&state, &task);
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/{id}
pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<TaskId>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let owner = require_owner(req.user_id)?;
    let completed = req
        .completed
        .ok_or_else(|| ApiError::validation("completed is required"))?;
    Ok(Json(state.tasks.set_completed(id, owner, completed)?))
}

/// DELETE /api/tasks/{id}?user_id=
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<TaskId>,
    ApiQuery(query): ApiQuery<OwnerQuery>,
) -> ApiResult<StatusCode> {
    let owner = require_owner(query.user_id)?;
    state.tasks.delete(id, owner)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fire-and-forget confirmation to the task's owner. Never affects the
/// response or the stored task.
fn notify_task_accepted(state: &AppState, task: &Task) {
    let Some(sender) = state.notifier.clone() else {
        return;
    };
    let user = match state.auth.get_user(task.user_id) {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(e) => {
            warn!(task_id = %task.id, error = %e, "owner lookup for task notification failed");
            return;
        }
    };
    let Some(address) = user.notification_address().map(str::to_string) else {
        debug!(user_id = %user.id, "owner has no address; skipping task notification");
        return;
    };

    let body = task_accepted_message(&user.name, &task.title);
    let timeout = ReminderSettings::from(&state.config.reminders).send_timeout;
    tokio::spawn(async move {
        dispatch(sender.as_ref(), &address, &body, timeout).await;
    });
}
