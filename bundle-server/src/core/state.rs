use std::sync::Arc;
use std::time::{Duration, Instant};

use bundle_printer::{BridgePrinter, LabelPainter};
use tokio::sync::mpsc;

use crate::core::{Config, Result};
use crate::db::BundleStorage;
use crate::printing::{
    DisabledLabelRenderer, LabelRenderer, LabelService, PrintDispatcher, PrintJob, PrintService,
    PrintWorker, RasterLabelRenderer, RetryPolicy,
};
use crate::services::{BundleLifecycle, VariantService};

/// 打印队列容量
const PRINT_QUEUE_SIZE: usize = 256;

/// 尚未启动的打印 worker 及其通道
///
/// 由 [`Server`](crate::core::Server) 在监听端口前 spawn
pub struct PrintQueue {
    pub worker: PrintWorker<BridgePrinter>,
    pub rx: mpsc::Receiver<PrintJob>,
}

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是廉价 clone (内部 Arc)。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | storage | redb 存储 |
/// | lifecycle | 捆包生命周期 |
/// | variants | 规格服务 |
/// | printing | 标签渲染 + 打印队列 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub storage: BundleStorage,
    pub lifecycle: BundleLifecycle,
    pub variants: VariantService,
    pub printing: PrintService,
    pub started_at: Instant,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录与标签缓存目录
    /// 2. 数据库 (work_dir/bundles.redb)
    /// 3. 各服务 (生命周期、规格、标签渲染、打印队列)
    pub fn initialize(config: &Config) -> Result<(Self, Option<PrintQueue>)> {
        std::fs::create_dir_all(&config.work_dir)?;
        std::fs::create_dir_all(config.cache_dir())?;

        let storage = BundleStorage::open(config.database_path())?;
        tracing::info!(path = ?config.database_path(), "Database opened");

        Self::with_storage(config, storage)
    }

    /// 使用已打开的存储构建状态 (测试使用内存存储)
    pub fn with_storage(
        config: &Config,
        storage: BundleStorage,
    ) -> Result<(Self, Option<PrintQueue>)> {
        let lifecycle = BundleLifecycle::new(storage.clone());
        lifecycle.counter().ensure_initialized()?;

        let renderer = Self::build_renderer(config);
        let labels = LabelService::new(storage.clone(), renderer, config.cache_dir());

        let (dispatcher, queue) = match &config.printer_bridge_host {
            Some(host) => {
                let printer = BridgePrinter::new(host)?;
                tracing::info!(endpoint = %printer.endpoint(), "Printer bridge configured");
                let (dispatcher, rx) = PrintDispatcher::new(PRINT_QUEUE_SIZE);
                let retry = RetryPolicy {
                    max_attempts: config.print_max_attempts,
                    delay: Duration::from_millis(config.print_retry_delay_ms),
                };
                let worker = PrintWorker::new(printer, dispatcher.clone(), retry);
                (dispatcher, Some(PrintQueue { worker, rx }))
            }
            None => {
                tracing::warn!("PRINTER_BRIDGE_HOST not set, print jobs will not be delivered");
                (PrintDispatcher::disabled(), None)
            }
        };

        let state = Self {
            config: config.clone(),
            variants: VariantService::new(storage.clone()),
            printing: PrintService::new(labels, dispatcher),
            lifecycle,
            storage,
            started_at: Instant::now(),
        };
        Ok((state, queue))
    }

    fn build_renderer(config: &Config) -> Arc<dyn LabelRenderer> {
        if !config.label_rendering {
            tracing::warn!("Label rendering disabled by configuration");
            return Arc::new(DisabledLabelRenderer);
        }

        let painter = match &config.label_logo_path {
            Some(path) => match LabelPainter::new().with_logo_file(path) {
                Ok(painter) => {
                    tracing::info!(path = %path, "Label logo loaded");
                    painter
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Failed to load label logo, rendering without it");
                    LabelPainter::new()
                }
            },
            None => LabelPainter::new(),
        };
        Arc::new(RasterLabelRenderer::new(painter))
    }

    /// 运行时间 (秒)
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
