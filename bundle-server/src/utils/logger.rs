//! 日志初始化
//!
//! 控制台 fmt 输出；配置 `LOG_DIR` 时改为按天滚动的文件 `bundle-server.YYYY-MM-DD`。
//! 设置了 `RUST_LOG` 时优先于配置的级别。

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// 初始化日志，`log_dir` 不存在时尝试创建，失败则退回控制台
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let Some(dir) = log_dir.map(Path::new) else {
        let _ = builder.try_init();
        return;
    };

    match std::fs::create_dir_all(dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(dir, "bundle-server");
            let _ = builder.with_ansi(false).with_writer(appender).try_init();
        }
        Err(e) => {
            let _ = builder.try_init();
            tracing::warn!(dir = ?dir, error = %e, "Cannot create log directory, logging to console");
        }
    }
}
