//! Die Mutation API 模块 (报废隔离)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/die-mutation/tasks | GET | RETURNED 捆包分页列表 |
//! | /api/die-mutation/tasks | POST | 批量标记 RETURNED |
//! | /api/die-mutation/tasks/{uid} | DELETE | 永久删除 RETURNED 捆包 |

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/die-mutation", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/tasks", get(handler::list).post(handler::mutate))
        .route("/tasks/{uid}", delete(handler::delete))
}
