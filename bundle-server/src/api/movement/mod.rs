//! Move API 模块 (出库到已售库)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/move", post(handler::move_bundles))
}
