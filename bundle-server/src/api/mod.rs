//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`bundles`] - 捆包创建、修改、查询、打印
//! - [`movement`] - 出库 (归档为已售)
//! - [`die_mutation`] - 报废任务
//! - [`variants`] - 规格查询与导入

pub mod bundles;
pub mod die_mutation;
pub mod health;
pub mod movement;
pub mod variants;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(bundles::router())
        .merge(movement::router())
        .merge(die_mutation::router())
        .merge(variants::router())
}

/// Router with state and middleware, ready to serve
pub fn build_router(state: ServerState) -> Router {
    build_app()
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
