//! Label printing
//!
//! - [`renderer`] - 标签渲染能力 (栅格 / 禁用)
//! - [`labels`] - 捆包 + 规格 → 标签字段, 缓存 PNG
//! - [`dispatcher`] - 打印队列、后台 worker 与投递状态
//! - [`service`] - 打印流程 (layout 0 图片 / layout 1 字段)

pub mod dispatcher;
pub mod labels;
pub mod renderer;
pub mod service;

pub use dispatcher::{
    DeliveryState, JobId, PrintDispatcher, PrintJob, PrintJobStatus, PrintWorker, RetryPolicy,
};
pub use labels::{LabelService, RenderedLabel, label_fields};
pub use renderer::{DisabledLabelRenderer, LabelRenderer, RasterLabelRenderer, RenderError};
pub use service::{PrintResponse, PrintService, parse_layout};
