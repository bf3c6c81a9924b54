use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness check, returns server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let reminders = match &state.notifier {
        Some(sender) => json!({
            "enabled": true,
            "channel": sender.name(),
            "interval_secs": state.config.reminders.interval_secs,
        }),
        None => json!({ "enabled": false }),
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "reminders": reminders,
    }))
}
