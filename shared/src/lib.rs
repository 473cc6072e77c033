//! Shared types for the bundle tracker
//!
//! Domain records (bundles, variants, archived bundles) and the request /
//! response shapes exchanged over HTTP. Used by `bundle-server` and its tests.

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    Bundle, BundleDetail, BundleFields, BundleInput, BundleStatus, BundleWithSection,
    DeletedBundle, DieItemError, DieItemResult, DieItemStatus, DieMutationRequest,
    DieMutationResponse, DieReason, MoveItemResult, MoveOutcome, MoveRequest, MoveResponse,
    NumberField, ReturnedBundlesPage, SectionSummary, SoldBundle, Variant,
    VariantSummary, VariantUpsert,
};
