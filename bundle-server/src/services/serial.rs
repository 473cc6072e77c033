//! Serial number generator
//!
//! Serial = two-digit year + month letter + counter value, e.g. `25A17` for
//! the 17th allocation issued in January 2025. `A` is January, `L` December.

use chrono::{Datelike, NaiveDate};

use crate::utils::{AppError, AppResult};

const MONTH_LETTERS: &[u8; 12] = b"ABCDEFGHIJKL";

/// A freshly allocated serial and the counter value to persist after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSerial {
    pub sr_no: String,
    pub next: String,
}

/// `A` for January through `L` for December
pub fn month_letter(date: NaiveDate) -> char {
    char::from(MONTH_LETTERS[date.month0() as usize])
}

/// Parse the stored counter text. Empty or non-numeric values mean the
/// counter is broken; nothing may be allocated from it.
pub fn parse_counter(value: &str) -> AppResult<u64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Counter("counter value is empty".to_string()));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| AppError::Counter(format!("counter value {trimmed:?} is not a number")))
}

/// Issue the serial for `date` from the current counter text
pub fn issue(date: NaiveDate, counter: &str) -> AppResult<IssuedSerial> {
    let n = parse_counter(counter)?;
    let next = n
        .checked_add(1)
        .ok_or_else(|| AppError::Counter("counter overflow".to_string()))?;

    Ok(IssuedSerial {
        sr_no: format!("{:02}{}{}", date.year().rem_euclid(100), month_letter(date), n),
        next: next.to_string(),
    })
}
