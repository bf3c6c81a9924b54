//! Login endpoint: POST /api/auth/login
//!
//! Request:  `{"name": "ada", "pin": "1234", "phone": "+15550001"}` (phone optional)
//! Response: `{"user_id": 1, "name": "ada", "phone": "+15550001", "is_new": true}`
//!
//! 201 when the name was seen for the first time, 200 otherwise. The returned
//! `user_id` is what the client passes on every task request.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskpulse_core::UserId;

use super::error::ApiResult;
use super::extract::ApiJson;
use crate::app::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pin: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub name: String,
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let outcome = state.auth.login(&req.name, &req.pin, req.phone.as_deref())?;
    let is_new = outcome.is_new();
    let user = outcome.into_user();

    let status = if is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(LoginResponse {
            user_id: user.id,
            name: user.name,
            phone: user.address,
            is_new: is_new.then_some(true),
        }),
    ))
}
