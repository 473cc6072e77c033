//! Number formatting for label text and bridge payloads
//!
//! Both helpers follow the output of the label station's JavaScript
//! formatting (`toFixed` / `toPrecision`), which the printer bridge and the
//! operators' paper records already depend on.

/// Fixed decimal places, e.g. `format_fixed(12.0, 3) == "12.000"`
pub fn format_fixed(value: f64, digits: usize) -> String {
    if let Some(s) = non_finite(value) {
        return s;
    }
    format!("{:.*}", digits, value)
}

/// Significant figures, e.g. `format_precision(2.08333, 3) == "2.08"`
///
/// Switches to exponent form (`1.23e+3`) when the decimal exponent is below
/// -6 or not smaller than `precision`.
pub fn format_precision(value: f64, precision: usize) -> String {
    if let Some(s) = non_finite(value) {
        return s;
    }
    let precision = precision.max(1);
    if value == 0.0 {
        return format!("{:.*}", precision - 1, 0.0);
    }

    // Rounded scientific form gives the exponent after rounding (9.996 -> 1.00e1)
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (sci.clone(), 0),
    };

    if exponent < -6 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{}", mantissa, sign, exponent.abs());
    }

    let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
    format!("{:.*}", decimals, value)
}

fn non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("NaN".to_string())
    } else if value.is_infinite() {
        Some(if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
    } else {
        None
    }
}
