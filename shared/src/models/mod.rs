//! Data Models
//!
//! - [`bundle`] - 在库捆包 / 已售捆包
//! - [`variant`] - 规格 (截面号、系列、重量范围)
//! - [`lifecycle`] - 出库 (move) 与报废 (die mutation) 批处理的请求/响应

pub mod bundle;
pub mod lifecycle;
pub mod variant;

pub use bundle::*;
pub use lifecycle::*;
pub use variant::*;
