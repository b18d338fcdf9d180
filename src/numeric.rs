// 🔢 Numeric formatting - rounding + duration codec
//
// All native values travel as strings. Numbers are parsed leniently
// (surrounding whitespace allowed), durations strictly (SS, MM:SS or HH:MM:SS).

// ============================================================================
// ROUNDING
// ============================================================================

/// Beyond this every finite f64 is already exact, so larger precisions are clamped
const MAX_DECIMAL_SHIFT: u32 = 350;

/// Round `value` to `decimals` fractional digits, half away from zero.
///
/// The shift is done on the decimal representation (`1.005` -> `1.005e2`)
/// rather than by multiplying, so `round_to(1.005, 2)` is `1.01` and not `1.0`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let places = decimals.min(MAX_DECIMAL_SHIFT) as i32;
    let shifted = shift_exponent(value, places);
    if !shifted.is_finite() {
        return value;
    }

    shift_exponent(shifted.round(), -places)
}

/// Move the decimal point of `value` by `places` using its shortest repr
fn shift_exponent(value: f64, places: i32) -> f64 {
    let repr = format!("{:e}", value);
    let Some((mantissa, exponent)) = repr.split_once('e') else {
        return value * 10f64.powi(places);
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value * 10f64.powi(places);
    };

    format!("{}e{}", mantissa, exponent + places)
        .parse::<f64>()
        .unwrap_or(value)
}

// ============================================================================
// NUMBERS
// ============================================================================

/// Parse a plain numeric native value. Empty or non-numeric text yields `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Shortest decimal string for `value`; negative zero prints as "0"
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Round then stringify
pub fn format_rounded(value: f64, decimals: u32) -> String {
    format_number(round_to(value, decimals))
}

/// Currency always renders with exactly two decimals
pub fn format_currency(value: f64) -> String {
    let rounded = round_to(value, 2);
    if rounded == 0.0 {
        return "0.00".to_string();
    }
    format!("{:.2}", rounded)
}

// ============================================================================
// DURATION CODEC
// ============================================================================

/// Parse `SS`, `MM:SS` or `HH:MM:SS` into seconds.
///
/// Components are non-negative integers of any width. Anything else
/// (signs, decimals, blanks, more than three components) yields `None`.
pub fn parse_duration(text: &str) -> Option<f64> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut components = Vec::with_capacity(parts.len());
    for part in parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        components.push(part.parse::<u64>().ok()? as f64);
    }

    let (hh, mm, ss) = match components.as_slice() {
        [hh, mm, ss] => (*hh, *mm, *ss),
        [mm, ss] => (0.0, *mm, *ss),
        [ss] => (0.0, 0.0, *ss),
        _ => return None,
    };

    Some(ss + 60.0 * mm + 3600.0 * hh)
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` once there is at least one hour.
///
/// Sign is dropped. The total is rounded to whole seconds before it is split,
/// so 59.6s renders as "01:00" rather than "00:60".
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.abs().round();
    if !total.is_finite() {
        return format_number(total);
    }

    let total = total as u64;
    let hh = total / 3600;
    let mm = (total % 3600) / 60;
    let ss = total % 60;

    if hh == 0 {
        format!("{:02}:{:02}", mm, ss)
    } else {
        format!("{:02}:{:02}:{:02}", hh, mm, ss)
    }
}

// ============================================================================
// TESTS
// ============================================================================
