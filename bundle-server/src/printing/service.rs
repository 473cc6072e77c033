//! Print flow
//!
//! - layout 0: render the label to `<cache>/<uid>.png`, then ask the bridge to
//!   print that file
//! - layout 1: compute the field payload, the bridge lays it out itself
//!
//! The caller learns whether the job was queued, never whether the bridge
//! printed it; delivery is tracked per job id.

use bundle_printer::{BridgePayload, ImagePayload, LabelLayout};
use serde::Serialize;
use tracing::{debug, info};

use super::dispatcher::{JobId, PrintDispatcher, PrintJobStatus};
use super::labels::{LabelService, RenderedLabel};
use crate::utils::{AppError, AppResult};

/// `{print: 1, job_id}` once the job is accepted, `{print: 0}` for an
/// unknown bundle
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PrintResponse {
    pub print: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

impl PrintResponse {
    fn skipped() -> Self {
        Self {
            print: 0,
            job_id: None,
        }
    }
}

/// Wire layout selector to [`LabelLayout`]
pub fn parse_layout(layout: u8) -> AppResult<LabelLayout> {
    LabelLayout::try_from(layout)
        .map_err(|_| AppError::validation(format!("Unknown label layout: {layout}")))
}

#[derive(Debug, Clone)]
pub struct PrintService {
    labels: LabelService,
    dispatcher: PrintDispatcher,
}

impl PrintService {
    pub fn new(labels: LabelService, dispatcher: PrintDispatcher) -> Self {
        Self { labels, dispatcher }
    }

    pub fn labels(&self) -> &LabelService {
        &self.labels
    }

    pub fn dispatcher(&self) -> &PrintDispatcher {
        &self.dispatcher
    }

    /// Render (or read field values) and queue a print job
    pub async fn print(&self, uid: &str, layout: LabelLayout) -> AppResult<PrintResponse> {
        let payload = match layout {
            LabelLayout::Compact => {
                let Some(rendered) = self.render(uid, layout).await? else {
                    return Ok(PrintResponse::skipped());
                };
                debug!(path = ?rendered.path, "Label cached for bridge");
                BridgePayload::Image(ImagePayload {
                    uid: layout.file_name(uid),
                    layout: layout.code(),
                })
            }
            LabelLayout::Full => {
                let Some(fields) = self.labels.field_payload(uid, layout)? else {
                    return Ok(PrintResponse::skipped());
                };
                BridgePayload::Fields(fields)
            }
        };

        let job_id = self.dispatcher.enqueue(payload);
        info!(uid = %uid, layout = layout.code(), job_id = ?job_id, "Print requested");
        Ok(PrintResponse { print: 1, job_id })
    }

    /// Render on the blocking pool
    pub async fn render(&self, uid: &str, layout: LabelLayout) -> AppResult<Option<RenderedLabel>> {
        let labels = self.labels.clone();
        let uid = uid.to_string();
        tokio::task::spawn_blocking(move || labels.render(&uid, layout)).await?
    }

    pub fn job_status(&self, id: JobId) -> AppResult<PrintJobStatus> {
        self.dispatcher
            .status(id)
            .ok_or_else(|| AppError::not_found(format!("Print job not found: {id}")))
    }
}
