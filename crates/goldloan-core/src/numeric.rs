//! # Numeric Input Parsing
//!
//! Every weight, purity and rate in the record arrives as the raw text the
//! user typed. The derivation model reads that text leniently:
//!
//! ```text
//! "10"      → 10.0
//! "10.5g"   → 10.5      (leading numeric prefix)
//! "  7"     → 7.0       (leading whitespace skipped)
//! ""        → nothing
//! "abc"     → nothing
//! ```
//!
//! "Nothing" is reported as `None` so callers choose what it means: the
//! stone/gross rule lets it pass, the derivation counts it as zero.

/// Reads the longest numeric prefix of `value`.
///
/// Returns `None` when no digits are found or the result is not finite.
pub fn parse_number(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    let mut frac_digits = 0;
    if end < len && bytes[end] == b'.' {
        let mut j = end + 1;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        frac_digits = j - end - 1;
        if int_digits > 0 || frac_digits > 0 {
            end = j;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads `value` as a number, counting anything unreadable as zero.
#[inline]
pub fn number_or_zero(value: &str) -> f64 {
    parse_number(value).unwrap_or(0.0)
}

/// Formats `value` with exactly `digits` fractional digits.
///
/// Negative zero is printed as plain zero.
pub fn to_fixed(value: f64, digits: usize) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.*}", digits, value)
}

// =============================================================================
// Unit Tests
// =============================================================================
