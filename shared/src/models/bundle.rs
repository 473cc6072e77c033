//! Bundle Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bundle lifecycle status
///
/// `Active` and `Returned` rows live in the active store; `Sold` only ever
/// appears on archived rows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum BundleStatus {
    #[default]
    Active,
    Returned,
    Sold,
}

impl BundleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleStatus::Active => "ACTIVE",
            BundleStatus::Returned => "RETURNED",
            BundleStatus::Sold => "SOLD",
        }
    }
}

impl std::fmt::Display for BundleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical unit of inventory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bundle {
    /// Opaque unique identifier, immutable (UUID v4)
    pub uid: String,
    /// Human serial, e.g. `25A17`
    pub sr_no: String,
    pub status: BundleStatus,
    /// Cut length in feet
    pub length: f64,
    pub quantity: i64,
    /// Total weight in kg
    pub weight: f64,
    /// Variant reference (`Variant::s_no`)
    pub vs_no: String,
    pub cast_id: String,
    /// Purchase order, always uppercase
    pub po_no: String,
    pub location: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Bundle {
    /// Build a new ACTIVE bundle from validated fields
    pub fn new(
        uid: impl Into<String>,
        sr_no: impl Into<String>,
        fields: BundleFields,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            sr_no: sr_no.into(),
            status: BundleStatus::Active,
            length: fields.length,
            quantity: fields.quantity,
            weight: fields.weight,
            vs_no: fields.vs_no,
            cast_id: fields.cast_id,
            po_no: fields.po_no,
            location: fields.location,
            created_at: now,
            modified_at: now,
        }
    }

    /// Overwrite the editable fields; `uid`, `sr_no` and `status` are kept
    pub fn apply(&mut self, fields: BundleFields, now: DateTime<Utc>) {
        self.length = fields.length;
        self.quantity = fields.quantity;
        self.weight = fields.weight;
        self.vs_no = fields.vs_no;
        self.cast_id = fields.cast_id;
        self.po_no = fields.po_no;
        self.location = fields.location;
        self.modified_at = now;
    }
}

/// Archived (sold) bundle: every bundle field plus the sale reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoldBundle {
    #[serde(flatten)]
    pub bundle: Bundle,
    pub reference: String,
}

impl SoldBundle {
    /// Archive projection of an active bundle, status forced to SOLD
    pub fn from_bundle(mut bundle: Bundle, reference: impl Into<String>) -> Self {
        bundle.status = BundleStatus::Sold;
        Self {
            bundle,
            reference: reference.into(),
        }
    }

    pub fn sr_no(&self) -> &str {
        &self.bundle.sr_no
    }

    pub fn uid(&self) -> &str {
        &self.bundle.uid
    }
}

/// Numeric form field: clients send either JSON numbers or numeric strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumberField {
    Number(f64),
    Text(String),
}

impl From<f64> for NumberField {
    fn from(value: f64) -> Self {
        NumberField::Number(value)
    }
}

impl From<&str> for NumberField {
    fn from(value: &str) -> Self {
        NumberField::Text(value.to_string())
    }
}

/// Create / modify payload as received on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleInput {
    pub cutlength: Option<NumberField>,
    pub quantity: Option<NumberField>,
    pub weight: Option<NumberField>,
    pub location: Option<NumberField>,
    pub cast_id: Option<String>,
    pub vs_no: Option<String>,
    pub po_no: Option<String>,
}

/// Validated and coerced bundle fields
#[derive(Debug, Clone, PartialEq)]
pub struct BundleFields {
    pub length: f64,
    pub quantity: i64,
    pub weight: f64,
    pub vs_no: String,
    pub cast_id: String,
    pub po_no: String,
    pub location: i64,
}

/// Identifiers of a permanently deleted bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeletedBundle {
    pub uid: String,
    pub sr_no: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> BundleFields {
        BundleFields {
            length: 12.0,
            quantity: 10,
            weight: 250.5,
            vs_no: "ISA-50".to_string(),
            cast_id: "C-1".to_string(),
            po_no: "PO-7".to_string(),
            location: 2,
        }
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&BundleStatus::Returned).unwrap(),
            "\"RETURNED\""
        );
        let status: BundleStatus = serde_json::from_str("\"SOLD\"").unwrap();
        assert_eq!(status, BundleStatus::Sold);
    }

    #[test]
    fn test_sold_bundle_keeps_uid_and_flattens() {
        let bundle = Bundle::new("u-1", "25A5", fields(), Utc::now());
        let sold = SoldBundle::from_bundle(bundle, "INV-9");

        assert_eq!(sold.uid(), "u-1");
        assert_eq!(sold.bundle.status, BundleStatus::Sold);

        let json = serde_json::to_value(&sold).unwrap();
        assert_eq!(json["sr_no"], "25A5");
        assert_eq!(json["reference"], "INV-9");
        assert_eq!(json["status"], "SOLD");
    }

    #[test]
    fn test_number_field_accepts_both_forms() {
        let input: BundleInput =
            serde_json::from_str(r#"{"cutlength":"12.5","quantity":4}"#).unwrap();
        assert_eq!(input.cutlength, Some(NumberField::Text("12.5".into())));
        assert_eq!(input.quantity, Some(NumberField::Number(4.0)));
        assert!(input.weight.is_none());
    }
}
