//! Printer bridge adapter
//!
//! The label station's printer is driven by a small bridge service that
//! accepts `POST /bt/printLabel` with a JSON job. Two job shapes exist:
//! - layout 0: the bridge prints a cached PNG (`{uid: "<uid>.png", layout: 0}`)
//! - layout 1: the bridge lays out the fields itself

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::error::{PrintError, PrintResult};
use crate::format::{format_fixed, format_precision};

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Deliver one job
    async fn print(&self, payload: &BridgePayload) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Print a cached label image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImagePayload {
    /// Cache file name, e.g. `<uid>.png`
    pub uid: String,
    pub layout: u8,
}

/// Print from computed fields; numbers are pre-formatted strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldPayload {
    pub uid: String,
    pub layout: u8,
    pub weight: String,
    pub weight_each: String,
    pub weight12ft: String,
    pub sr_no: String,
    pub quantity: i64,
    pub length: String,
    pub series: String,
    pub po: String,
}

impl FieldPayload {
    /// Format measurements the way the bridge expects: total weight and
    /// length with 3 decimals, per-unit weights with 3 significant figures
    #[allow(clippy::too_many_arguments)]
    pub fn from_measurements(
        uid: impl Into<String>,
        layout: u8,
        sr_no: impl Into<String>,
        quantity: i64,
        length: f64,
        weight: f64,
        series: impl Into<String>,
        po: impl Into<String>,
    ) -> Self {
        let each = weight / quantity as f64;
        Self {
            uid: uid.into(),
            layout,
            weight: format_fixed(weight, 3),
            weight_each: format_precision(each, 3),
            weight12ft: format_precision(each / length * 12.0, 3),
            sr_no: sr_no.into(),
            quantity,
            length: format_fixed(length, 3),
            series: series.into(),
            po: po.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BridgePayload {
    Fields(FieldPayload),
    Image(ImagePayload),
}

impl BridgePayload {
    /// Bundle uid or image name the job refers to
    pub fn subject(&self) -> &str {
        match self {
            BridgePayload::Fields(f) => &f.uid,
            BridgePayload::Image(i) => &i.uid,
        }
    }
}

/// HTTP printer bridge
#[derive(Debug, Clone)]
pub struct BridgePrinter {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl BridgePrinter {
    /// Create a bridge client for `host` (`host` or `host:port`)
    pub fn new(host: &str) -> PrintResult<Self> {
        let host = host.trim();
        if host.is_empty() || host.contains('/') {
            return Err(PrintError::InvalidConfig(format!(
                "Invalid bridge host: {:?}",
                host
            )));
        }
        Ok(Self::from_endpoint(format!("http://{}/bt/printLabel", host)))
    }

    /// Create from a full endpoint URL
    pub fn from_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Printer for BridgePrinter {
    #[instrument(skip(self, payload), fields(endpoint = %self.endpoint, subject = %payload.subject()))]
    async fn print(&self, payload: &BridgePayload) -> PrintResult<()> {
        info!("Sending label job to bridge");

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PrintError::Timeout(format!("{}: {}", self.endpoint, e))
                } else {
                    PrintError::Connection(format!("{}: {}", self.endpoint, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Bridge rejected label job");
            return Err(PrintError::Rejected(status.as_u16()));
        }

        info!("Label job accepted by bridge");
        Ok(())
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match self
            .client
            .head(&self.endpoint)
            .timeout(check_timeout)
            .send()
            .await
        {
            Ok(_) => {
                info!("Printer bridge online");
                true
            }
            Err(e) => {
                warn!(error = %e, "Printer bridge offline");
                false
            }
        }
    }
}
