//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`tables`] - 桌台会话接口
//! - [`orders`] - 当前订单接口
//! - [`menu`] - 菜单读取接口
//! - [`payments`] - 结账接口
//! - [`kitchen`] - 厨房显示 WebSocket

pub mod health;
pub mod kitchen;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod tables;

mod session;

pub use session::SessionId;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Compose every facade router onto the shared state and wrap the
/// cross-cutting layers (request id, trace, CORS).
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(menu::router())
        .merge(payments::router())
        .merge(kitchen::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
