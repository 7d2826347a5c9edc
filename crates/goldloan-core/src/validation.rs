//! # Validation Module
//!
//! Field-level and cross-field rules for the gold loan record.
//!
//! ## Two-Tier Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Presence vs Format                                 │
//! │                                                                         │
//! │  Tier 1: Presence                                                      │
//! │  └── validate_required ─────► "required"                               │
//! │                                                                         │
//! │  Tier 2: Format (THIS MODULE, every other rule)                        │
//! │  ├── empty value  ──────────► Ok  (tier 1 reports it instead)          │
//! │  └── wrong shape  ──────────► invalidPan, invalidAadhar, ...           │
//! │                                                                         │
//! │  A blank PAN shows "required", never "invalidPan".                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule is a free function from a value to `Ok(())` or a
//! [`Violation`]. Nothing here touches the record; the report module wires
//! rules to fields.
//!
//! ## Usage
//! ```rust
//! use goldloan_core::validation::{validate_aadhar, validate_pan};
//! use goldloan_core::Violation;
//!
//! assert!(validate_pan("abcde1234f").is_ok());
//! assert_eq!(validate_aadhar("012345678901"), Err(Violation::InvalidAadhar));
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::calculation::net_weight_totals;
use crate::error::Violation;
use crate::numeric::parse_number;
use crate::types::OrnamentRow;
use crate::{
    MAX_ANNUAL_INCOME, MAX_COINS_NET_WEIGHT, MAX_TOTAL_NET_WEIGHT, MIN_ANNUAL_INCOME,
    MIN_FULL_NAME_LEN,
};

/// Result type for validation rules.
pub type ValidationResult = Result<(), Violation>;

// =============================================================================
// Patterns
// =============================================================================
// All patterns are string literals checked by the unit tests below.

static PAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("PAN pattern"));

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").expect("decimal pattern"));

static FULL_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]+$").expect("full name pattern"));

static HALLMARK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\- ]{3,}$").expect("hallmark pattern"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern")
});

const EMAIL_MAX_LEN: usize = 254;
const EMAIL_LOCAL_MAX_LEN: usize = 64;

// =============================================================================
// Presence Rules
// =============================================================================

/// Rejects a blank (empty or whitespace-only) value.
pub fn validate_required(value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(Violation::Required);
    }
    Ok(())
}

/// Rejects an attestation that has not been confirmed.
pub fn validate_required_true(value: bool) -> ValidationResult {
    if !value {
        return Err(Violation::RequiredTrue);
    }
    Ok(())
}

// =============================================================================
// Identity Rules
// =============================================================================

/// Validates an Aadhar number.
///
/// ## Rules
/// - Exactly 12 ASCII digits
/// - First digit is not `0` or `1`
///
/// ## Example
/// ```rust
/// use goldloan_core::validation::validate_aadhar;
///
/// assert!(validate_aadhar("234567890123").is_ok());
/// assert!(validate_aadhar("134567890123").is_err());
/// assert!(validate_aadhar("").is_ok()); // presence is checked separately
/// ```
pub fn validate_aadhar(value: &str) -> ValidationResult {
    if value.is_empty() {
        return Ok(());
    }

    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 12
        && bytes.iter().all(u8::is_ascii_digit)
        && !matches!(bytes[0], b'0' | b'1');

    if !well_formed {
        return Err(Violation::InvalidAadhar);
    }
    Ok(())
}

/// Upper-cases a PAN as typed.
///
/// Applied once when the value enters the record, so the stored value and
/// the validated value are the same string.
pub fn normalize_pan(value: &str) -> String {
    value.to_uppercase()
}

/// Validates a PAN (`AAAAA9999A`).
///
/// The check runs on the upper-cased value, so the result does not depend
/// on the case the user typed in.
pub fn validate_pan(value: &str) -> ValidationResult {
    if value.is_empty() {
        return Ok(());
    }

    if !PAN_RE.is_match(&normalize_pan(value)) {
        return Err(Violation::InvalidPan);
    }
    Ok(())
}

/// Validates an Indian mobile number: 10 digits starting with 6, 7, 8 or 9.
pub fn validate_phone(value: &str) -> ValidationResult {
    if value.is_empty() {
        return Ok(());
    }

    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().all(u8::is_ascii_digit)
        && matches!(bytes[0], b'6'..=b'9');

    if !well_formed {
        return Err(Violation::InvalidPhone);
    }
    Ok(())
}

/// Validates an email address.
pub fn validate_email(value: &str) -> ValidationResult {
    if value.is_empty() {
        return Ok(());
    }

    let local_len = value.split('@').next().map_or(0, str::len);
    if value.len() > EMAIL_MAX_LEN || local_len > EMAIL_LOCAL_MAX_LEN || !EMAIL_RE.is_match(value)
    {
        return Err(Violation::Email);
    }
    Ok(())
}

// =============================================================================
// Text Rules
// =============================================================================

/// Rejects a non-empty value shorter than `min` characters.
pub fn validate_min_length(value: &str, min: usize) -> ValidationResult {
    if value.is_empty() {
        return Ok(());
    }

    if value.chars().count() < min {
        return Err(Violation::MinLength { min });
    }
    Ok(())
}

/// Validates a borrower's full name: letters and spaces, at least four
/// characters.
pub fn validate_full_name(value: &str) -> ValidationResult {
    validate_min_length(value, MIN_FULL_NAME_LEN)?;

    if !value.is_empty() && !FULL_NAME_RE.is_match(value) {
        return Err(Violation::Pattern);
    }
    Ok(())
}

/// Validates a hallmark code: letters, digits, hyphens or spaces, at least
/// three characters.
pub fn validate_hallmark(value: &str) -> ValidationResult {
    if value.is_empty() {
        return Ok(());
    }

    if !HALLMARK_RE.is_match(value) {
        return Err(Violation::Pattern);
    }
    Ok(())
}

// =============================================================================
// Numeric Rules
// =============================================================================

/// Accepts a non-empty string of ASCII digits.
pub fn validate_digits(value: &str) -> ValidationResult {
    if value.is_empty() {
        return Ok(());
    }

    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Violation::NonNumeric);
    }
    Ok(())
}

/// Accepts digits with an optional fractional part of one or two digits
/// (`1`, `1.5`, `100.25`).
pub fn validate_decimal(value: &str) -> ValidationResult {
    if value.is_empty() {
        return Ok(());
    }

    if !DECIMAL_RE.is_match(value) {
        return Err(Violation::InvalidDecimal);
    }
    Ok(())
}

/// Validates the borrower's annual income.
///
/// ## Rules
/// - Digits only
/// - Between 1 and 1,000,000 inclusive
pub fn validate_annual_income(value: &str) -> ValidationResult {
    if value.is_empty() {
        return Ok(());
    }

    validate_digits(value)?;

    // A digit string only fails to parse when it overflows, which is over the cap too
    let amount = value.parse::<u64>().unwrap_or(u64::MAX);
    if amount < MIN_ANNUAL_INCOME {
        return Err(Violation::Min {
            min: MIN_ANNUAL_INCOME,
        });
    }
    if amount > MAX_ANNUAL_INCOME {
        return Err(Violation::Max {
            max: MAX_ANNUAL_INCOME,
        });
    }
    Ok(())
}

// =============================================================================
// Cross-Field Rules
// =============================================================================

/// Rejects a row whose stone weight is larger than its gross weight.
///
/// Blank values count as zero. A value that cannot be read as a number
/// never blocks here; its own format rule reports it.
pub fn validate_stone_vs_gross(gross: &str, stone: &str) -> ValidationResult {
    let read = |v: &str| {
        if v.is_empty() {
            Some(0.0)
        } else {
            parse_number(v)
        }
    };

    let (Some(gross), Some(stone)) = (read(gross), read(stone)) else {
        return Ok(());
    };

    if stone > gross {
        return Err(Violation::StoneExceedsGross);
    }
    Ok(())
}

// =============================================================================
// Aggregate Rules
// =============================================================================

/// Rejects a row list whose summed net weight is above 1000 g.
///
/// ## Example
/// ```rust
/// use goldloan_core::{OrnamentRow, validation::validate_weight_ceiling};
///
/// let at_limit = vec![OrnamentRow::new().with_gross_weight("1000")];
/// assert!(validate_weight_ceiling(&at_limit).is_ok());
///
/// let over = vec![OrnamentRow::new().with_gross_weight("1000.01")];
/// assert!(validate_weight_ceiling(&over).is_err());
/// ```
pub fn validate_weight_ceiling(rows: &[OrnamentRow]) -> ValidationResult {
    if net_weight_totals(rows).total > MAX_TOTAL_NET_WEIGHT {
        return Err(Violation::TotalNetExceeded);
    }
    Ok(())
}

/// Rejects a row list whose summed net weight of coins is above 50 g.
pub fn validate_coins_ceiling(rows: &[OrnamentRow]) -> ValidationResult {
    if net_weight_totals(rows).coins > MAX_COINS_NET_WEIGHT {
        return Err(Violation::CoinsExceeded);
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
