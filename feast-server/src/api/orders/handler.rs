//! Current-order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use shared::error::{AppError, AppResult};
use shared::models::{OrderItem, OrderItemRequest, OrderItemStatus};
use shared::response::{ApiResponse, PageResponse};

use crate::api::SessionId;
use crate::core::ServerState;
use crate::orders::OrderWithItems;

/// Request to create or append to the session's order
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitOrderRequest {
    #[validate(length(min = 1, message = "item list must not be empty"))]
    pub items: Vec<OrderItemRequest>,
}

/// Pagination query for list endpoints
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

/// POST /api/orders/current - 下单（已有订单则追加）
pub async fn submit_order(
    State(state): State<ServerState>,
    SessionId(session_id): SessionId,
    Json(payload): Json<SubmitOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let created = state.orders.submit(&session_id, &payload.items).await?;
    Ok(Json(ApiResponse::ok(created)))
}

/// GET /api/orders/current - 当前订单
pub async fn current_order(
    State(state): State<ServerState>,
    SessionId(session_id): SessionId,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let order = state.orders.current_order(&session_id).await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// POST /api/orders/current/items - 加菜
pub async fn add_items(
    State(state): State<ServerState>,
    SessionId(session_id): SessionId,
    Json(payload): Json<SubmitOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let appended = state.orders.add_items(&session_id, &payload.items).await?;
    Ok(Json(ApiResponse::ok(appended)))
}

/// GET /api/orders/current/items - 当前订单明细（分页）
pub async fn list_items(
    State(state): State<ServerState>,
    SessionId(session_id): SessionId,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PageResponse<OrderItem>>>> {
    let page = state
        .orders
        .list_items(&session_id, query.page, query.page_size)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// PATCH /api/orders/current/items/{id}/status/{served|cancelled}
pub async fn update_item_status(
    State(state): State<ServerState>,
    SessionId(session_id): SessionId,
    Path((item_id, action)): Path<(i64, String)>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let status = match action.as_str() {
        "served" => OrderItemStatus::Served,
        "cancelled" => OrderItemStatus::Cancelled,
        other => {
            return Err(AppError::validation(format!(
                "Unknown item status action '{}'",
                other
            )));
        }
    };

    let item = state
        .orders
        .update_item_status(&session_id, item_id, status)
        .await?;
    Ok(Json(ApiResponse::ok(item)))
}
