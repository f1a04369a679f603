//! Menu API Handlers

use axum::{
    Json,
    extract::{Query, State},
};

use shared::error::{AppError, AppResult};
use shared::models::Product;
use shared::response::{ApiResponse, PageResponse};

use crate::api::orders::PageQuery;
use crate::core::ServerState;

/// GET /api/menu/products - 菜单（分页）
///
/// Count and page run concurrently; either failure fails the request.
pub async fn list_products(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PageResponse<Product>>>> {
    let limit = query.page_size.clamp(1, 100);
    let offset = (query.page.max(1) - 1) * limit;

    let (total, rows) = tokio::try_join!(
        async { state.store.count_products().await.map_err(AppError::from) },
        async {
            state
                .store
                .list_products(limit, offset)
                .await
                .map_err(AppError::from)
        },
    )?;

    Ok(Json(ApiResponse::ok(PageResponse::new(total, limit, rows))))
}
