//! Variant Model

use serde::{Deserialize, Serialize};

use super::bundle::NumberField;

/// Product variant (section) a bundle instantiates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Section number, unique key
    pub s_no: String,
    pub name: String,
    pub series: String,
    pub print_series: String,
    pub breadth: Option<f64>,
    pub length: Option<f64>,
    pub thickness: Option<f64>,
    pub leg: Option<f64>,
    /// JSON text `{"start": n, "end": n}` as stored; may be empty or broken
    /// in storage, always valid once read through the variant service
    pub range: Option<String>,
}

/// `GET /api/variant/all` row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantSummary {
    pub s_no: String,
    pub series: String,
    pub range: String,
}

/// Section summary embedded in bundle listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionSummary {
    pub s_no: String,
    pub name: String,
    pub series: String,
}

impl From<&Variant> for SectionSummary {
    fn from(variant: &Variant) -> Self {
        Self {
            s_no: variant.s_no.clone(),
            name: variant.name.clone(),
            series: variant.series.clone(),
        }
    }
}

/// Variant import payload (upsert by `s_no`)
///
/// Dimension fields that do not parse as numbers are stored as null.
/// `range` may arrive as a JSON object or as already-encoded text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantUpsert {
    pub s_no: String,
    pub name: String,
    pub series: String,
    pub print_series: String,
    #[serde(default)]
    pub breadth: Option<NumberField>,
    #[serde(default)]
    pub length: Option<NumberField>,
    #[serde(default)]
    pub thickness: Option<NumberField>,
    #[serde(default)]
    pub leg: Option<NumberField>,
    #[serde(default)]
    pub range: Option<serde_json::Value>,
}
