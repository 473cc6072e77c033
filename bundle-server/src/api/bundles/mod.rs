//! Bundle API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/bundle/create | POST | 创建捆包 (分配流水号) |
//! | /api/bundle/modify/{uid} | PUT | 修改捆包 |
//! | /api/bundle/current-number | GET | 当前流水号计数 |
//! | /api/bundle/set-number | POST | 覆盖流水号计数 |
//! | /api/bundle/recents | GET | 全部在库捆包 (新→旧) |
//! | /api/bundle/{uid} | GET | 捆包详情 (含规格) |
//! | /api/bundle/{uid}/label/{layout} | GET | 标签 PNG |
//! | /api/bundle/print/{layout}/{uid} | GET | 打印标签 |
//! | /api/bundle/print/jobs/{id} | GET | 打印任务状态 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/bundle", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/create", post(handler::create))
        .route("/modify/{uid}", put(handler::modify))
        .route("/current-number", get(handler::current_number))
        .route("/set-number", post(handler::set_number))
        .route("/recents", get(handler::recents))
        .route("/print/jobs/{id}", get(handler::print_job))
        .route("/print/{layout}/{uid}", get(handler::print))
        .route("/{uid}", get(handler::get_by_uid))
        .route("/{uid}/label/{layout}", get(handler::label))
}
