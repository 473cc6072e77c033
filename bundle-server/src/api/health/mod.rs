//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api | GET | 存活探测 `{"status": 200}` |
//! | /health | GET | 服务状态与存储统计 |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "uptime_seconds": 42,
//!   "bundles": 120,
//!   "sold_bundles": 3400,
//!   "variants": 85,
//!   "label_rendering": true,
//!   "printer_bridge": true
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api", get(ping))
        .route("/health", get(health))
}

#[derive(Serialize)]
pub struct PingResponse {
    status: u16,
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok)
    status: &'static str,
    version: &'static str,
    /// 运行时间 (秒)
    uptime_seconds: u64,
    bundles: u64,
    sold_bundles: u64,
    variants: u64,
    /// 标签渲染是否可用
    label_rendering: bool,
    /// 是否配置了打印桥
    printer_bridge: bool,
}

/// GET /api - 存活探测
async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: 200 })
}

/// GET /health - 健康检查
async fn health(State(state): State<ServerState>) -> AppResult<Json<HealthResponse>> {
    let stats = state.storage.get_stats()?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        bundles: stats.bundle_count,
        sold_bundles: stats.sold_bundle_count,
        variants: stats.variant_count,
        label_rendering: state.printing.labels().rendering_enabled(),
        printer_bridge: state.printing.dispatcher().is_enabled(),
    }))
}
