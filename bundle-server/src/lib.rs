//! Bundle Server - 钢材捆包标签与库存服务
//!
//! # 架构概述
//!
//! - **数据库** (`db`): 嵌入式 redb 存储 (在库 / 已售 / 规格 / 计数器)
//! - **生命周期** (`services`): 流水号分配、出库、报废、删除
//! - **标签打印** (`printing`): 标签渲染缓存 + 打印桥接队列
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! bundle-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # redb 存储与计数器
//! ├── services/      # 生命周期与规格
//! ├── printing/      # 标签渲染与打印队列
//! └── utils/         # 错误、日志、验证
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod printing;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use db::BundleStorage;
pub use services::{BundleLifecycle, VariantService};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

/// 加载 `.env` 并初始化日志，返回读取到的配置
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}

pub fn print_banner() {
    println!(
        r#"
    ____                  ____
   / __ )__  ______  ____/ / /__
  / __  / / / / __ \/ __  / / _ \
 / /_/ / /_/ / / / / /_/ / /  __/
/_____/\__,_/_/ /_/\__,_/_/\___/
    "#
    );
}
