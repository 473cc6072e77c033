//! Bundle lifecycle
//!
//! Creation, modification and disposition of bundles. Every state change is
//! one redb write transaction:
//! - create: counter read, serial issue, uniqueness check, insert and counter
//!   advance commit together
//! - move: archive copy and active delete commit together
//!
//! Batch operations run each serial as its own unit on the blocking pool and
//! join; one failing serial never aborts its siblings.

use std::collections::HashMap;

use chrono::{Local, NaiveDate, Utc};
use futures::future::join_all;
use shared::models::{
    Bundle, BundleDetail, BundleInput, BundleStatus, BundleWithSection, DeletedBundle,
    DieItemError, DieItemResult, DieItemStatus, DieMutationRequest, DieMutationResponse,
    DieReason, MoveItemResult, MoveOutcome, MoveResponse, ReturnedBundlesPage, SectionSummary,
    SoldBundle,
};
use tracing::{error, info, instrument, warn};

use super::serial;
use super::variant::VariantService;
use crate::db::{BundleStorage, SequenceCounter, StorageError, StorageResult};
use crate::utils::validation::{
    MAX_NOTE_LEN, bundle_fields, parse_serial_list, validate_required_text, validate_serial_batch,
    validate_text_len,
};
use crate::utils::{AppError, AppResult};

/// Default page size of the returned bundles listing
pub const DEFAULT_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct BundleLifecycle {
    storage: BundleStorage,
    counter: SequenceCounter,
    variants: VariantService,
}

impl BundleLifecycle {
    pub fn new(storage: BundleStorage) -> Self {
        Self {
            counter: SequenceCounter::new(storage.clone()),
            variants: VariantService::new(storage.clone()),
            storage,
        }
    }

    pub fn counter(&self) -> &SequenceCounter {
        &self.counter
    }

    // ========== Counter ==========

    /// Operator override of the next serial number
    pub fn set_counter(&self, value: &str) -> AppResult<String> {
        let n = value
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::validation("Invalid bundle number"))?;
        let value = n.to_string();
        self.counter.write(&value)?;
        warn!(value = %value, "Serial counter overridden");
        Ok(value)
    }

    // ========== Create / modify ==========

    /// Create a bundle dated today (local time)
    pub fn create(&self, input: &BundleInput) -> AppResult<Bundle> {
        self.create_on(Local::now().date_naive(), input)
    }

    /// Create a bundle whose serial is issued for `date`
    #[instrument(skip(self, input))]
    pub fn create_on(&self, date: NaiveDate, input: &BundleInput) -> AppResult<Bundle> {
        let fields = bundle_fields(input)?;

        let txn = self.storage.begin_write()?;
        let current = self.counter.read_in(&txn)?;
        let issued = serial::issue(date, &current)?;

        if self.storage.serial_in_use(&txn, &issued.sr_no)? {
            warn!(sr_no = %issued.sr_no, "Issued serial already in use");
            return Err(AppError::Conflict(format!(
                "Serial {} already exists",
                issued.sr_no
            )));
        }

        let bundle = Bundle::new(
            uuid::Uuid::new_v4().to_string(),
            issued.sr_no,
            fields,
            Utc::now(),
        );
        self.storage.put_bundle(&txn, &bundle)?;
        self.counter.write_in(&txn, &issued.next)?;
        txn.commit().map_err(StorageError::from)?;

        info!(uid = %bundle.uid, sr_no = %bundle.sr_no, next = %issued.next, "Bundle created");
        Ok(bundle)
    }

    /// Overwrite the editable fields of an active bundle
    #[instrument(skip(self, input))]
    pub fn modify(&self, uid: &str, input: &BundleInput) -> AppResult<Bundle> {
        let fields = bundle_fields(input)?;

        let txn = self.storage.begin_write()?;
        let mut bundle = self
            .storage
            .get_bundle_in(&txn, uid)?
            .ok_or_else(|| AppError::not_found(format!("Bundle not found: {uid}")))?;

        bundle.apply(fields, Utc::now());
        self.storage.put_bundle(&txn, &bundle)?;
        txn.commit().map_err(StorageError::from)?;

        info!(uid = %bundle.uid, sr_no = %bundle.sr_no, "Bundle modified");
        Ok(bundle)
    }

    // ========== Reads ==========

    /// Active bundle with its variant
    pub fn detail(&self, uid: &str) -> AppResult<BundleDetail> {
        let bundle = self
            .storage
            .get_bundle(uid)?
            .ok_or_else(|| AppError::not_found(format!("Bundle not found: {uid}")))?;
        let section = self.variants.find(&bundle.vs_no)?;
        Ok(BundleDetail { bundle, section })
    }

    /// All active-store bundles, newest first
    pub fn recents(&self) -> AppResult<Vec<Bundle>> {
        let mut bundles = self.storage.list_bundles()?;
        bundles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bundles)
    }

    /// RETURNED bundles by `modified_at` descending, with section summaries
    pub fn list_returned(&self, limit: usize, offset: usize) -> AppResult<ReturnedBundlesPage> {
        let mut returned: Vec<Bundle> = self
            .storage
            .list_bundles()?
            .into_iter()
            .filter(|b| b.status == BundleStatus::Returned)
            .collect();
        returned.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        let total = returned.len();

        let mut sections: HashMap<String, Option<SectionSummary>> = HashMap::new();
        let mut bundles = Vec::new();
        for bundle in returned.into_iter().skip(offset).take(limit) {
            let section = match sections.get(&bundle.vs_no) {
                Some(cached) => cached.clone(),
                None => {
                    let summary = self
                        .storage
                        .get_variant(&bundle.vs_no)?
                        .as_ref()
                        .map(SectionSummary::from);
                    sections.insert(bundle.vs_no.clone(), summary.clone());
                    summary
                }
            };
            bundles.push(BundleWithSection { bundle, section });
        }

        Ok(ReturnedBundlesPage {
            bundles,
            total,
            limit,
            offset,
        })
    }

    // ========== Move ==========

    /// Archive one serial as sold
    pub fn move_one(&self, sr_no: &str, reference: &str) -> MoveItemResult {
        match self.try_move(sr_no, reference) {
            Ok(outcome) => MoveItemResult {
                sr_no: sr_no.to_string(),
                outcome,
                error: None,
            },
            Err(e) => {
                error!(sr_no = %sr_no, error = %e, "Move failed");
                MoveItemResult {
                    sr_no: sr_no.to_string(),
                    outcome: MoveOutcome::Error,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn try_move(&self, sr_no: &str, reference: &str) -> StorageResult<MoveOutcome> {
        let txn = self.storage.begin_write()?;

        if self.storage.find_sold_by_sr_in(&txn, sr_no)?.is_some() {
            let Some(ghost) = self.storage.find_bundle_by_sr_in(&txn, sr_no)? else {
                txn.abort()?;
                info!(sr_no = %sr_no, "Bundle already sold");
                return Ok(MoveOutcome::AlreadySold);
            };
            self.storage.remove_bundle(&txn, &ghost)?;
            txn.commit()?;
            warn!(sr_no = %sr_no, uid = %ghost.uid, "Sold bundle still active, removed ghost copy");
            return Ok(MoveOutcome::GhostRemoved);
        }

        let Some(active) = self.storage.find_bundle_by_sr_in(&txn, sr_no)? else {
            txn.abort()?;
            info!(sr_no = %sr_no, "Serial unknown, nothing to move");
            return Ok(MoveOutcome::Unknown);
        };

        if active.status != BundleStatus::Active {
            txn.abort()?;
            warn!(sr_no = %sr_no, uid = %active.uid, status = %active.status, "Bundle is not ACTIVE, refusing to sell");
            return Ok(MoveOutcome::Quarantined);
        }

        let sold = SoldBundle::from_bundle(active.clone(), reference);
        self.storage.put_sold_bundle(&txn, &sold)?;
        self.storage.remove_bundle(&txn, &active)?;
        txn.commit()?;

        info!(sr_no = %sr_no, uid = %active.uid, reference = %reference, "Bundle moved to sold");
        Ok(MoveOutcome::Moved)
    }

    /// Move a comma separated batch of serials
    pub async fn move_batch(
        &self,
        move_data: Option<&str>,
        reference: Option<&str>,
    ) -> AppResult<MoveResponse> {
        let serials = validate_serial_batch(parse_serial_list(move_data.unwrap_or_default()))?;
        let reference = reference.unwrap_or_default().trim().to_string();
        validate_required_text(&reference, "ref", MAX_NOTE_LEN)?;

        let tasks = serials.iter().map(|sr_no| {
            let this = self.clone();
            let sr_no = sr_no.clone();
            let reference = reference.clone();
            tokio::task::spawn_blocking(move || this.move_one(&sr_no, &reference))
        });
        let joined = join_all(tasks).await;

        let results: Vec<MoveItemResult> = serials
            .into_iter()
            .zip(joined)
            .map(|(sr_no, joined)| {
                joined.unwrap_or_else(|e| MoveItemResult {
                    sr_no,
                    outcome: MoveOutcome::Error,
                    error: Some(format!("Worker task failed: {e}")),
                })
            })
            .collect();

        let failed = results
            .iter()
            .filter(|r| matches!(r.outcome, MoveOutcome::Error | MoveOutcome::Quarantined))
            .count();
        let message = (failed > 0).then(|| {
            warn!(failed, total = results.len(), "Move batch finished with errors");
            format!("{failed} of {} bundles could not be moved", results.len())
        });

        Ok(MoveResponse {
            done: true,
            message,
            results,
        })
    }

    // ========== Die mutation ==========

    /// Mark one active bundle RETURNED
    pub fn die_mutate_one(&self, sr_no: &str) -> DieItemResult {
        match self.try_die_mutate(sr_no) {
            Ok(Some(uid)) => DieItemResult {
                sr_no: sr_no.to_string(),
                status: DieItemStatus::Mutated,
                uid: Some(uid),
                error: None,
            },
            Ok(None) => DieItemResult {
                sr_no: sr_no.to_string(),
                status: DieItemStatus::NotFound,
                uid: None,
                error: None,
            },
            Err(e) => {
                error!(sr_no = %sr_no, error = %e, "Die mutation failed");
                DieItemResult {
                    sr_no: sr_no.to_string(),
                    status: DieItemStatus::Error,
                    uid: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn try_die_mutate(&self, sr_no: &str) -> StorageResult<Option<String>> {
        let txn = self.storage.begin_write()?;
        let Some(mut bundle) = self.storage.find_bundle_by_sr_in(&txn, sr_no)? else {
            txn.abort()?;
            return Ok(None);
        };

        bundle.status = BundleStatus::Returned;
        bundle.modified_at = Utc::now();
        self.storage.put_bundle(&txn, &bundle)?;
        txn.commit()?;
        Ok(Some(bundle.uid))
    }

    /// Quarantine a batch of serials
    pub async fn die_mutation_batch(
        &self,
        request: DieMutationRequest,
    ) -> AppResult<DieMutationResponse> {
        let serials = request.bundles.unwrap_or_default();
        if serials.is_empty() {
            return Err(AppError::validation(
                "Invalid request: 'bundles' must be a non-empty array",
            ));
        }
        let serials = validate_serial_batch(serials)?;

        let reason = request
            .reason
            .as_deref()
            .map(str::parse::<DieReason>)
            .transpose()
            .map_err(AppError::Validation)?;
        let notes = request.notes.unwrap_or_default();
        validate_text_len(&notes, "notes", MAX_NOTE_LEN)?;

        let tasks = serials.iter().map(|sr_no| {
            let this = self.clone();
            let sr_no = sr_no.clone();
            tokio::task::spawn_blocking(move || this.die_mutate_one(&sr_no))
        });
        let joined = join_all(tasks).await;

        let results: Vec<DieItemResult> = serials
            .into_iter()
            .zip(joined)
            .map(|(sr_no, joined)| {
                joined.unwrap_or_else(|e| DieItemResult {
                    sr_no,
                    status: DieItemStatus::Error,
                    uid: None,
                    error: Some(format!("Worker task failed: {e}")),
                })
            })
            .collect();

        let mut errors = Vec::new();
        for result in &results {
            match result.status {
                DieItemStatus::Mutated => info!(
                    sr_no = %result.sr_no,
                    reason = reason.map(|r| r.as_str()).unwrap_or("not specified"),
                    notes = if notes.is_empty() { "none" } else { notes.as_str() },
                    "Bundle die mutated"
                ),
                DieItemStatus::NotFound => errors.push(DieItemError {
                    sr_no: result.sr_no.clone(),
                    error: "Bundle not found".to_string(),
                }),
                DieItemStatus::Error => errors.push(DieItemError {
                    sr_no: result.sr_no.clone(),
                    error: result
                        .error
                        .clone()
                        .unwrap_or_else(|| "Unknown error".to_string()),
                }),
            }
        }

        let failed = errors.len();
        Ok(DieMutationResponse {
            success: failed == 0,
            processed: results.len() - failed,
            failed,
            results,
            errors: (!errors.is_empty()).then_some(errors),
        })
    }

    /// Permanently delete a RETURNED bundle
    #[instrument(skip(self))]
    pub fn permanent_delete(&self, uid: &str) -> AppResult<DeletedBundle> {
        let txn = self.storage.begin_write()?;
        let bundle = self
            .storage
            .get_bundle_in(&txn, uid)?
            .ok_or_else(|| AppError::not_found("Bundle not found"))?;

        if bundle.status != BundleStatus::Returned {
            return Err(AppError::Guard {
                message: "Can only delete bundles with RETURNED status".to_string(),
                current_status: bundle.status,
            });
        }

        self.storage.remove_bundle(&txn, &bundle)?;
        txn.commit().map_err(StorageError::from)?;

        info!(uid = %bundle.uid, sr_no = %bundle.sr_no, "Bundle permanently deleted");
        Ok(DeletedBundle {
            uid: bundle.uid,
            sr_no: bundle.sr_no,
        })
    }
}
