//! Payments API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use shared::error::{AppError, AppResult};
use shared::models::Payment;
use shared::response::ApiResponse;

use crate::core::ServerState;

/// Request to settle an order
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub order_id: i64,
    pub method: String,
    #[validate(length(max = 500, message = "note is too long"))]
    pub note: Option<String>,
}

/// POST /api/payments - 结账
pub async fn create_payment(
    State(state): State<ServerState>,
    Json(payload): Json<CreatePaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let payment = state
        .payments
        .settle(payload.order_id, &payload.method, payload.note)
        .await?;
    Ok(Json(ApiResponse::ok(payment)))
}
