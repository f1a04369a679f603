//! Current-order API 模块

mod handler;

pub use handler::PageQuery;

use axum::{Router, routing::patch, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/current",
            post(handler::submit_order).get(handler::current_order),
        )
        .route(
            "/current/items",
            post(handler::add_items).get(handler::list_items),
        )
        .route(
            "/current/items/{id}/status/{action}",
            patch(handler::update_item_status),
        )
}
