//! Variant API 模块 (规格)

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/variant", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", put(handler::upsert))
        .route("/all", get(handler::list))
        .route("/{s_no}", get(handler::get_by_s_no))
}
