//! 服务层 - 业务逻辑
//!
//! # 服务列表
//!
//! - [`serial`] - 流水号生成 (`25A17`)
//! - [`BundleLifecycle`] - 捆包创建、修改、出库、报废与删除
//! - [`VariantService`] - 规格读取 (range 归一化) 与导入

pub mod lifecycle;
pub mod serial;
pub mod variant;

pub use lifecycle::{BundleLifecycle, DEFAULT_PAGE_LIMIT};
pub use serial::IssuedSerial;
pub use variant::{DEFAULT_RANGE, VariantService, normalize_range};
