//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResponse`] - 错误响应结构
//!
//! # 错误码规范
//!
//! | 错误码 | HTTP | 说明 |
//! |--------|------|------|
//! | E0002 | 400 | 验证失败 (字段非数字、批次为空、原因码无效) |
//! | E0003 | 404 | 资源不存在 |
//! | E0004 | 409 | 流水号冲突 |
//! | E0005 | 400 | 状态守卫 (非 RETURNED 不可删除) |
//! | E9001 | 500 | 内部错误 |
//! | E9002 | 500 | 数据库错误 |
//! | E9003 | 500 | 流水号计数器损坏 |
//! | E9004 | 503 | 标签渲染不可用 |

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::models::BundleStatus;
use tracing::error;

use crate::db::StorageError;

/// 错误响应结构
///
/// ```json
/// {
///   "code": "E0003",
///   "message": "Bundle not found: 25A5",
///   "data": null
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码
    pub code: String,
    /// 消息
    pub message: String,
    /// 附加数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Resource already exists: {0}")]
    /// 资源冲突 (409)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("{message}")]
    /// 状态守卫 (400)
    Guard {
        message: String,
        current_status: BundleStatus,
    },

    // ========== 系统错误 (5xx) ==========
    #[error("Database error: {0}")]
    /// 数据库错误 (500)
    Database(String),

    #[error("Serial counter invalid: {0}")]
    /// 计数器值无法解析 (500)
    Counter(String),

    #[error("Service unavailable: {0}")]
    /// 能力缺失 (503)
    Unavailable(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut data = None;
        let (status, code, message) = match &self {
            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            // Guard (400)
            AppError::Guard {
                message,
                current_status,
            } => {
                data = Some(serde_json::json!({ "currentStatus": current_status }));
                (StatusCode::BAD_REQUEST, "E0005", message.clone())
            }

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                )
            }

            // Counter errors (500)
            AppError::Counter(msg) => {
                error!(target: "counter", error = %msg, "Serial counter is unusable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9003",
                    format!("Serial counter invalid: {msg}"),
                )
            }

            // Missing capability (503)
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "E9004", msg.clone())
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse {
            code: code.to_string(),
            message,
            data,
        });

        (status, body).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", e.body_text()))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Worker task failed: {e}"))
    }
}
