//! Variant service
//!
//! Every variant read goes through [`normalize_range`]: callers always see a
//! `range` that parses as JSON with `start` and `end` keys, whatever the row
//! holds in storage.

use shared::models::{NumberField, Variant, VariantSummary, VariantUpsert};
use tracing::{info, warn};

use crate::db::{BundleStorage, StorageError, StorageResult};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text, validate_text_len};
use crate::utils::{AppError, AppResult};

/// Substituted for missing or unparseable ranges
pub const DEFAULT_RANGE: &str = r#"{"start":0,"end":0}"#;

/// Return `range` unchanged when it is a JSON object with `start` and `end`,
/// otherwise [`DEFAULT_RANGE`]
pub fn normalize_range(range: Option<&str>, s_no: &str) -> String {
    let Some(raw) = range.filter(|r| !r.trim().is_empty()) else {
        info!(s_no = %s_no, "Variant has no range, using default");
        return DEFAULT_RANGE.to_string();
    };

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) if value.get("start").is_some() && value.get("end").is_some() => {
            raw.to_string()
        }
        Ok(_) => {
            warn!(s_no = %s_no, range = %raw, "Variant range lacks start/end, using default");
            DEFAULT_RANGE.to_string()
        }
        Err(e) => {
            warn!(s_no = %s_no, range = %raw, error = %e, "Variant range is not valid JSON, using default");
            DEFAULT_RANGE.to_string()
        }
    }
}

fn normalized(mut variant: Variant) -> Variant {
    variant.range = Some(normalize_range(variant.range.as_deref(), &variant.s_no));
    variant
}

/// Dimensions that do not parse are stored as null
fn optional_number(value: Option<&NumberField>) -> Option<f64> {
    match value? {
        NumberField::Number(n) => Some(*n).filter(|n| n.is_finite()),
        NumberField::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
    }
}

/// Objects are stored as their JSON text, strings as given
fn range_text(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct VariantService {
    storage: BundleStorage,
}

impl VariantService {
    pub fn new(storage: BundleStorage) -> Self {
        Self { storage }
    }

    /// Normalized variant by section number
    pub fn find(&self, s_no: &str) -> StorageResult<Option<Variant>> {
        Ok(self.storage.get_variant(s_no)?.map(normalized))
    }

    pub fn get(&self, s_no: &str) -> AppResult<Variant> {
        self.find(s_no)?
            .ok_or_else(|| AppError::not_found(format!("Variant not found: {s_no}")))
    }

    /// `{s_no, series, range}` for every variant, ordered by `s_no`
    pub fn list_summaries(&self) -> AppResult<Vec<VariantSummary>> {
        let mut variants = self.storage.list_variants()?;
        variants.sort_by(|a, b| a.s_no.cmp(&b.s_no));

        Ok(variants
            .into_iter()
            .map(|v| VariantSummary {
                range: normalize_range(v.range.as_deref(), &v.s_no),
                s_no: v.s_no,
                series: v.series,
            })
            .collect())
    }

    /// Insert or replace a variant keyed by `s_no`
    pub fn upsert(&self, input: VariantUpsert) -> AppResult<Variant> {
        validate_required_text(&input.s_no, "s_no", MAX_SHORT_TEXT_LEN)?;
        validate_text_len(&input.name, "name", MAX_SHORT_TEXT_LEN)?;
        validate_text_len(&input.series, "series", MAX_SHORT_TEXT_LEN)?;
        validate_text_len(&input.print_series, "print_series", MAX_SHORT_TEXT_LEN)?;

        let variant = Variant {
            s_no: input.s_no.trim().to_string(),
            name: input.name,
            series: input.series,
            print_series: input.print_series,
            breadth: optional_number(input.breadth.as_ref()),
            length: optional_number(input.length.as_ref()),
            thickness: optional_number(input.thickness.as_ref()),
            leg: optional_number(input.leg.as_ref()),
            range: range_text(input.range.as_ref()),
        };

        let txn = self.storage.begin_write()?;
        self.storage.put_variant(&txn, &variant)?;
        txn.commit().map_err(StorageError::from)?;

        info!(s_no = %variant.s_no, "Variant saved");
        Ok(normalized(variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert(s_no: &str, range: Option<serde_json::Value>) -> VariantUpsert {
        VariantUpsert {
            s_no: s_no.to_string(),
            name: "Angle".to_string(),
            series: "S-200".to_string(),
            print_series: "200".to_string(),
            breadth: Some(NumberField::Number(50.0)),
            length: None,
            thickness: Some("n/a".into()),
            leg: Some("6".into()),
            range,
        }
    }

    #[test]
    fn test_normalize_range() {
        assert_eq!(normalize_range(None, "X"), DEFAULT_RANGE);
        assert_eq!(normalize_range(Some("   "), "X"), DEFAULT_RANGE);
        assert_eq!(normalize_range(Some("{broken"), "X"), DEFAULT_RANGE);
        assert_eq!(normalize_range(Some(r#"{"start":1}"#), "X"), DEFAULT_RANGE);
        assert_eq!(normalize_range(Some("[1,2]"), "X"), DEFAULT_RANGE);

        let valid = r#"{"start": 1.5, "end": 2}"#;
        assert_eq!(normalize_range(Some(valid), "X"), valid);
    }

    #[test]
    fn test_default_range_parses() {
        let value: serde_json::Value = serde_json::from_str(DEFAULT_RANGE).unwrap();
        assert_eq!(value["start"], 0);
        assert_eq!(value["end"], 0);
    }

    #[test]
    fn test_upsert_coerces_dimensions_and_range() {
        let service = VariantService::new(BundleStorage::open_in_memory().unwrap());
        let saved = service
            .upsert(upsert("ISA-50", Some(serde_json::json!({"start": 3, "end": 4}))))
            .unwrap();

        assert_eq!(saved.breadth, Some(50.0));
        assert_eq!(saved.thickness, None);
        assert_eq!(saved.leg, Some(6.0));
        let range: serde_json::Value = serde_json::from_str(saved.range.as_deref().unwrap()).unwrap();
        assert_eq!(range["end"], 4);

        // upsert replaces
        service.upsert(upsert("ISA-50", None)).unwrap();
        let reread = service.get("ISA-50").unwrap();
        assert_eq!(reread.range.as_deref(), Some(DEFAULT_RANGE));
    }

    #[test]
    fn test_reads_are_normalized() {
        let storage = BundleStorage::open_in_memory().unwrap();
        let service = VariantService::new(storage.clone());

        let txn = storage.begin_write().unwrap();
        let mut raw = Variant {
            s_no: "B".into(),
            name: "Beam".into(),
            series: "S".into(),
            print_series: "S".into(),
            breadth: None,
            length: None,
            thickness: None,
            leg: None,
            range: Some("not json".into()),
        };
        storage.put_variant(&txn, &raw).unwrap();
        raw.s_no = "A".into();
        raw.range = Some(r#"{"start":1,"end":2}"#.into());
        storage.put_variant(&txn, &raw).unwrap();
        txn.commit().unwrap();

        let summaries = service.list_summaries().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].s_no, "A");
        assert_eq!(summaries[0].range, r#"{"start":1,"end":2}"#);
        assert_eq!(summaries[1].range, DEFAULT_RANGE);

        assert_eq!(service.get("B").unwrap().range.as_deref(), Some(DEFAULT_RANGE));
        assert!(matches!(service.get("Z"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_upsert_requires_key() {
        let service = VariantService::new(BundleStorage::open_in_memory().unwrap());
        assert!(service.upsert(upsert(" ", None)).is_err());
    }
}
