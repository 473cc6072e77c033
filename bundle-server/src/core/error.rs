//! 启动期错误
//!
//! 请求处理期间的错误见 [`crate::utils::AppError`]

use thiserror::Error;

use crate::db::StorageError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("存储初始化失败: {0}")]
    Storage(#[from] StorageError),

    #[error("打印桥配置错误: {0}")]
    Printer(#[from] bundle_printer::PrintError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
