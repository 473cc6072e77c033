//! Outbound print queue
//!
//! Request handlers enqueue bridge payloads and return immediately; a single
//! [`PrintWorker`] drains the queue, delivering each job with bounded retry.
//! Job progress is kept in memory and can be polled by id.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bundle_printer::{BridgePayload, PrintError, Printer};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Finished jobs older than this many ids are forgotten
const MAX_TRACKED_JOBS: u64 = 1000;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Queued,
    Sending,
    Delivered,
    Failed,
}

impl DeliveryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryState::Delivered | DeliveryState::Failed)
    }
}

/// Observable state of one job
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PrintJobStatus {
    pub id: JobId,
    /// Bundle uid or image name
    pub subject: String,
    pub state: DeliveryState,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: JobId,
    pub payload: BridgePayload,
}

/// Enqueue side of the print queue (cheap to clone)
#[derive(Debug, Clone)]
pub struct PrintDispatcher {
    tx: Option<mpsc::Sender<PrintJob>>,
    jobs: Arc<DashMap<JobId, PrintJobStatus>>,
    next_id: Arc<AtomicU64>,
}

impl PrintDispatcher {
    /// Dispatcher plus the receiver its worker drains
    pub fn new(buffer_size: usize) -> (Self, mpsc::Receiver<PrintJob>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        let dispatcher = Self {
            tx: Some(tx),
            jobs: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (dispatcher, rx)
    }

    /// No printer bridge configured: jobs are logged and dropped
    pub fn disabled() -> Self {
        Self {
            tx: None,
            jobs: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queue a job. Returns its id, or `None` when dispatch is disabled.
    /// A full or closed queue marks the job failed; callers are never blocked.
    pub fn enqueue(&self, payload: BridgePayload) -> Option<JobId> {
        let Some(tx) = &self.tx else {
            info!(subject = %payload.subject(), "Printer bridge not configured, job dropped");
            return None;
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let subject = payload.subject().to_string();
        self.prune(id);
        self.jobs.insert(
            id,
            PrintJobStatus {
                id,
                subject: subject.clone(),
                state: DeliveryState::Queued,
                attempts: 0,
                error: None,
                updated_at: Utc::now(),
            },
        );

        if let Err(e) = tx.try_send(PrintJob { id, payload }) {
            error!(job_id = id, subject = %subject, error = %e, "Print queue rejected job");
            self.update(id, DeliveryState::Failed, 0, Some(format!("Queue unavailable: {e}")));
        } else {
            debug!(job_id = id, subject = %subject, "Print job queued");
        }
        Some(id)
    }

    pub fn status(&self, id: JobId) -> Option<PrintJobStatus> {
        self.jobs.get(&id).map(|entry| entry.value().clone())
    }

    fn update(&self, id: JobId, state: DeliveryState, attempts: u32, error: Option<String>) {
        if let Some(mut entry) = self.jobs.get_mut(&id) {
            entry.state = state;
            entry.attempts = attempts;
            entry.error = error;
            entry.updated_at = Utc::now();
        }
    }

    fn prune(&self, newest: JobId) {
        if newest <= MAX_TRACKED_JOBS {
            return;
        }
        let horizon = newest - MAX_TRACKED_JOBS;
        self.jobs
            .retain(|id, status| *id > horizon || !status.state.is_terminal());
    }
}

/// Bounded retry with linear backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Wait after the `attempt`-th failure
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt)
    }
}

/// Config errors and 4xx answers will not get better by retrying
fn is_retryable(error: &PrintError) -> bool {
    match error {
        PrintError::Connection(_) | PrintError::Timeout(_) => true,
        PrintError::Rejected(status) => *status >= 500,
        _ => false,
    }
}

/// Background worker delivering queued jobs to the printer bridge
pub struct PrintWorker<P: Printer> {
    printer: P,
    dispatcher: PrintDispatcher,
    retry: RetryPolicy,
}

impl<P: Printer> PrintWorker<P> {
    pub fn new(printer: P, dispatcher: PrintDispatcher, retry: RetryPolicy) -> Self {
        Self {
            printer,
            dispatcher,
            retry,
        }
    }

    /// 运行 worker（阻塞直到通道关闭或收到关闭信号）
    pub async fn run(self, mut rx: mpsc::Receiver<PrintJob>, shutdown: CancellationToken) {
        info!(max_attempts = self.retry.max_attempts, "Print worker started");
        if !self.printer.is_online().await {
            warn!("Printer bridge unreachable at startup, jobs will be retried on delivery");
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Print worker received shutdown signal");
                    break;
                }
                job = rx.recv() => {
                    let Some(job) = job else {
                        info!("Print queue closed, worker stopping");
                        break;
                    };
                    self.deliver(job).await;
                }
            }
        }
    }

    async fn deliver(&self, job: PrintJob) {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            self.dispatcher
                .update(job.id, DeliveryState::Sending, attempt, None);

            match self.printer.print(&job.payload).await {
                Ok(()) => {
                    self.dispatcher
                        .update(job.id, DeliveryState::Delivered, attempt, None);
                    info!(job_id = job.id, subject = %job.payload.subject(), attempt, "Print job delivered");
                    return;
                }
                Err(e) => {
                    warn!(job_id = job.id, attempt, error = %e, "Print attempt failed");
                    last_error = e.to_string();
                    if !is_retryable(&e) {
                        self.dispatcher
                            .update(job.id, DeliveryState::Failed, attempt, Some(last_error));
                        return;
                    }
                    if attempt < max_attempts {
                        tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    }
                }
            }
        }

        error!(job_id = job.id, subject = %job.payload.subject(), attempts = max_attempts, error = %last_error, "Print job failed");
        self.dispatcher
            .update(job.id, DeliveryState::Failed, max_attempts, Some(last_error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundle_printer::{ImagePayload, PrintResult};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers from a script, then succeeds
    #[derive(Clone, Default)]
    struct ScriptedPrinter {
        script: Arc<Mutex<VecDeque<PrintResult<()>>>>,
        delivered: Arc<Mutex<Vec<BridgePayload>>>,
    }

    impl ScriptedPrinter {
        fn failing_with(errors: Vec<PrintError>) -> Self {
            let printer = Self::default();
            printer
                .script
                .lock()
                .unwrap()
                .extend(errors.into_iter().map(Err));
            printer
        }
    }

    impl Printer for ScriptedPrinter {
        async fn print(&self, payload: &BridgePayload) -> PrintResult<()> {
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(result) => result,
                None => {
                    self.delivered.lock().unwrap().push(payload.clone());
                    Ok(())
                }
            }
        }

        async fn is_online(&self) -> bool {
            true
        }
    }

    fn payload(uid: &str) -> BridgePayload {
        BridgePayload::Image(ImagePayload {
            uid: format!("{uid}.png"),
            layout: 0,
        })
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::from_millis(1),
        }
    }

    /// Enqueue, then run the worker until every job is terminal
    async fn drain(
        printer: ScriptedPrinter,
        retry: RetryPolicy,
        jobs: &[&str],
    ) -> (PrintDispatcher, Vec<JobId>) {
        let (dispatcher, rx) = PrintDispatcher::new(16);
        let ids: Vec<JobId> = jobs
            .iter()
            .map(|uid| dispatcher.enqueue(payload(uid)).unwrap())
            .collect();

        let worker = PrintWorker::new(printer, dispatcher.clone(), retry);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(worker.run(rx, shutdown.clone()));
        for _ in 0..200 {
            let all_done = ids
                .iter()
                .all(|id| dispatcher.status(*id).is_some_and(|s| s.state.is_terminal()));
            if all_done {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        shutdown.cancel();
        handle.await.unwrap();
        (dispatcher, ids)
    }

    #[tokio::test]
    async fn test_job_delivered() {
        let printer = ScriptedPrinter::default();
        let (dispatcher, ids) = drain(printer.clone(), fast_retry(3), &["a"]).await;

        let status = dispatcher.status(ids[0]).unwrap();
        assert_eq!(status.state, DeliveryState::Delivered);
        assert_eq!(status.attempts, 1);
        assert_eq!(status.subject, "a.png");
        assert_eq!(printer.delivered.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let printer = ScriptedPrinter::failing_with(vec![
            PrintError::Connection("refused".into()),
            PrintError::Rejected(503),
        ]);
        let (dispatcher, ids) = drain(printer.clone(), fast_retry(3), &["a"]).await;

        let status = dispatcher.status(ids[0]).unwrap();
        assert_eq!(status.state, DeliveryState::Delivered);
        assert_eq!(status.attempts, 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let printer = ScriptedPrinter::failing_with(vec![
            PrintError::Timeout("slow".into()),
            PrintError::Timeout("slow".into()),
            PrintError::Timeout("slow".into()),
        ]);
        let (dispatcher, ids) = drain(printer.clone(), fast_retry(2), &["a", "b"]).await;

        let first = dispatcher.status(ids[0]).unwrap();
        assert_eq!(first.state, DeliveryState::Failed);
        assert_eq!(first.attempts, 2);
        assert!(first.error.unwrap().contains("slow"));
        // the queue keeps going after a failed job
        assert_eq!(dispatcher.status(ids[1]).unwrap().state, DeliveryState::Delivered);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let printer = ScriptedPrinter::failing_with(vec![PrintError::Rejected(400)]);
        let (dispatcher, ids) = drain(printer, fast_retry(5), &["a"]).await;

        let status = dispatcher.status(ids[0]).unwrap();
        assert_eq!(status.state, DeliveryState::Failed);
        assert_eq!(status.attempts, 1);
    }

    #[test]
    fn test_disabled_dispatcher_drops_jobs() {
        let dispatcher = PrintDispatcher::disabled();
        assert!(!dispatcher.is_enabled());
        assert_eq!(dispatcher.enqueue(payload("a")), None);
    }

    #[test]
    fn test_full_queue_marks_job_failed() {
        let (dispatcher, _rx) = PrintDispatcher::new(1);
        let first = dispatcher.enqueue(payload("a")).unwrap();
        let second = dispatcher.enqueue(payload("b")).unwrap();

        assert_eq!(dispatcher.status(first).unwrap().state, DeliveryState::Queued);
        assert_eq!(dispatcher.status(second).unwrap().state, DeliveryState::Failed);
        assert_ne!(first, second);
    }

    #[test]
    fn test_linear_backoff() {
        let retry = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(200),
        };
        assert_eq!(retry.delay_for(1), Duration::from_millis(200));
        assert_eq!(retry.delay_for(2), Duration::from_millis(400));
    }
}
