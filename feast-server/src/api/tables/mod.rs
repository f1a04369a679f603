//! Table session API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/session",
            post(handler::open_session).get(handler::current_session),
        )
        .route("/session/extension", post(handler::extend_session))
}
