//! Table Session API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::error::{AppError, AppResult};
use shared::models::TableSession;
use shared::response::ApiResponse;

use crate::api::SessionId;
use crate::core::ServerState;
use crate::sessions::OpenedSession;

/// Request to open a session on a table
#[derive(Debug, Deserialize, Validate)]
pub struct OpenSessionRequest {
    pub table_id: i64,
    #[validate(range(min = 1, message = "number of people must be positive"))]
    pub number_of_people: i32,
}

/// Request to extend the caller's session
#[derive(Debug, Deserialize, Validate)]
pub struct ExtendSessionRequest {
    #[validate(range(min = 1, message = "minutes must be positive"))]
    pub minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct ExtendedSession {
    pub remaining_seconds: u64,
}

/// POST /api/tables/session - 开台
pub async fn open_session(
    State(state): State<ServerState>,
    Json(payload): Json<OpenSessionRequest>,
) -> AppResult<Json<ApiResponse<OpenedSession>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let opened = state
        .sessions
        .open(payload.table_id, payload.number_of_people)
        .await?;
    Ok(Json(ApiResponse::ok(opened)))
}

/// GET /api/tables/session - 当前会话
pub async fn current_session(
    State(state): State<ServerState>,
    SessionId(session_id): SessionId,
) -> AppResult<Json<ApiResponse<TableSession>>> {
    let session = state.sessions.current(&session_id).await?;
    Ok(Json(ApiResponse::ok(session)))
}

/// POST /api/tables/session/extension - 延长会话
pub async fn extend_session(
    State(state): State<ServerState>,
    SessionId(session_id): SessionId,
    Json(payload): Json<ExtendSessionRequest>,
) -> AppResult<Json<ApiResponse<ExtendedSession>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let remaining = state.sessions.extend(&session_id, payload.minutes).await?;
    Ok(Json(ApiResponse::ok(ExtendedSession {
        remaining_seconds: remaining.as_secs(),
    })))
}
