//! Lifecycle batch requests and responses
//!
//! Wire shapes for `POST /api/move` and `/api/die-mutation/tasks`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::bundle::Bundle;
use super::variant::{SectionSummary, Variant};

// ========== Die mutation ==========

/// Reason for quarantining a bundle (exact, case-sensitive)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DieReason {
    Defective,
    Lost,
    Damaged,
    Other,
}

impl DieReason {
    pub const ALL: [DieReason; 4] = [
        DieReason::Defective,
        DieReason::Lost,
        DieReason::Damaged,
        DieReason::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DieReason::Defective => "defective",
            DieReason::Lost => "lost",
            DieReason::Damaged => "damaged",
            DieReason::Other => "other",
        }
    }
}

impl FromStr for DieReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DieReason::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = DieReason::ALL.iter().map(|r| r.as_str()).collect();
                format!("Invalid reason. Must be one of: {}", valid.join(", "))
            })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DieMutationRequest {
    pub bundles: Option<Vec<String>>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DieItemStatus {
    Mutated,
    NotFound,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DieItemResult {
    pub sr_no: String,
    pub status: DieItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DieItemError {
    pub sr_no: String,
    pub error: String,
}

/// ```json
/// { "success": true, "processed": 3, "failed": 0, "results": [...] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DieMutationResponse {
    pub success: bool,
    pub processed: usize,
    pub failed: usize,
    pub results: Vec<DieItemResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<DieItemError>>,
}

/// Bundle with its section summary (returned bundles listing)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleWithSection {
    #[serde(flatten)]
    pub bundle: Bundle,
    pub section: Option<SectionSummary>,
}

/// `GET /api/die-mutation/tasks`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnedBundlesPage {
    pub bundles: Vec<BundleWithSection>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Bundle with its full variant (`GET /api/bundle/{uid}`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleDetail {
    #[serde(flatten)]
    pub bundle: Bundle,
    pub section: Option<Variant>,
}

// ========== Move ==========

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Comma separated serial numbers, e.g. `25A5,25A6`
    #[serde(rename = "moveData")]
    pub move_data: Option<String>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Copied to the archive and removed from the active store
    Moved,
    /// Already archived, nothing to do
    AlreadySold,
    /// Archived and still active: the active copy was deleted
    GhostRemoved,
    /// RETURNED (quarantined) bundles cannot be sold, left in place
    Quarantined,
    /// Neither store knows the serial
    Unknown,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoveItemResult {
    pub sr_no: String,
    pub outcome: MoveOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoveResponse {
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<MoveItemResult>,
}
