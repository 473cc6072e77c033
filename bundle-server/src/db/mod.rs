//! 数据库层
//!
//! - [`storage`] - redb 存储 (在库 / 已售 / 规格 / meta)
//! - [`counter`] - 捆包流水号计数器

pub mod counter;
pub mod storage;

pub use counter::{COUNTER_KEY, INITIAL_COUNTER, SequenceCounter};
pub use storage::{BundleStorage, StorageError, StorageResult, StorageStats};
