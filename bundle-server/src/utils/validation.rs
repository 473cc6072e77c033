//! Input validation helpers
//!
//! Numeric form fields arrive as JSON numbers or numeric strings; both are
//! accepted, anything that does not parse is a validation error (no `NaN`
//! ever reaches storage).

use shared::models::{BundleFields, BundleInput, NumberField};

use crate::utils::{AppError, AppResult};

// ── Text length limits ──────────────────────────────────────────────

/// Variant references, cast ids, purchase orders
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Sale references, die mutation notes
pub const MAX_NOTE_LEN: usize = 500;

/// Serials per batch request
pub const MAX_BATCH_LEN: usize = 1000;

// ── Field helpers ───────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    validate_text_len(value, field, max_len)
}

pub fn validate_text_len(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Parse a required float field
pub fn parse_number(value: Option<&NumberField>, field: &str) -> AppResult<f64> {
    let parsed = match value {
        None => return Err(AppError::validation(format!("{field} is required"))),
        Some(NumberField::Number(n)) => Some(*n),
        Some(NumberField::Text(s)) => s.trim().parse::<f64>().ok(),
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(AppError::validation(format!("{field} must be a number"))),
    }
}

/// Parse a required integer field (`"12"`, `12` and `12.0` are accepted)
pub fn parse_integer(value: Option<&NumberField>, field: &str) -> AppResult<i64> {
    let parsed = match value {
        None => return Err(AppError::validation(format!("{field} is required"))),
        Some(NumberField::Number(n)) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
            Some(*n as i64)
        }
        Some(NumberField::Number(_)) => None,
        Some(NumberField::Text(s)) => s.trim().parse::<i64>().ok(),
    };
    parsed.ok_or_else(|| AppError::validation(format!("{field} must be an integer")))
}

/// Validate and coerce a create / modify payload
pub fn bundle_fields(input: &BundleInput) -> AppResult<BundleFields> {
    let length = parse_number(input.cutlength.as_ref(), "cutlength")?;
    let quantity = parse_integer(input.quantity.as_ref(), "quantity")?;
    let weight = parse_number(input.weight.as_ref(), "weight")?;
    let location = parse_integer(input.location.as_ref(), "location")?;

    // per-piece and per-12ft weights divide by these
    if length <= 0.0 {
        return Err(AppError::validation("cutlength must be greater than 0"));
    }
    if quantity <= 0 {
        return Err(AppError::validation("quantity must be greater than 0"));
    }
    if weight < 0.0 {
        return Err(AppError::validation("weight must not be negative"));
    }

    let vs_no = input.vs_no.clone().unwrap_or_default();
    validate_required_text(&vs_no, "vs_no", MAX_SHORT_TEXT_LEN)?;

    let cast_id = input.cast_id.clone().unwrap_or_default();
    validate_required_text(&cast_id, "cast_id", MAX_SHORT_TEXT_LEN)?;

    let po_no = input.po_no.as_deref().unwrap_or_default().to_uppercase();
    validate_text_len(&po_no, "po_no", MAX_SHORT_TEXT_LEN)?;

    Ok(BundleFields {
        length,
        quantity,
        weight,
        vs_no: vs_no.trim().to_string(),
        cast_id: cast_id.trim().to_string(),
        po_no,
        location,
    })
}

/// Split a comma separated serial list; blanks are dropped, duplicates
/// collapse onto their first occurrence
pub fn parse_serial_list(raw: &str) -> Vec<String> {
    let mut serials: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let sr_no = part.trim();
        if !sr_no.is_empty() && !serials.iter().any(|s| s == sr_no) {
            serials.push(sr_no.to_string());
        }
    }
    serials
}

/// Trim and dedupe a batch of serials, rejecting an empty batch.
/// Elements are taken as submitted: a comma inside one is not a separator.
pub fn validate_serial_batch(submitted: Vec<String>) -> AppResult<Vec<String>> {
    let mut serials: Vec<String> = Vec::with_capacity(submitted.len());
    for sr_no in submitted {
        let sr_no = sr_no.trim();
        if !sr_no.is_empty() && !serials.iter().any(|s| s == sr_no) {
            serials.push(sr_no.to_string());
        }
    }
    if serials.is_empty() {
        return Err(AppError::validation(
            "Invalid request: serial list must be non-empty",
        ));
    }
    if serials.len() > MAX_BATCH_LEN {
        return Err(AppError::validation(format!(
            "Too many serials ({}, max {MAX_BATCH_LEN})",
            serials.len()
        )));
    }
    Ok(serials)
}

/// Hyphenated lowercase form of a UUID; anything else is returned as given
pub fn canonical_uid(uid: &str) -> String {
    match uuid::Uuid::parse_str(uid.trim()) {
        Ok(parsed) => parsed.hyphenated().to_string(),
        Err(_) => uid.to_string(),
    }
}
