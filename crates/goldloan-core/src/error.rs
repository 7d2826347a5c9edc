//! # Error Types
//!
//! Domain-specific error types for goldloan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  goldloan-core errors (this file)                                      │
//! │  ├── CoreError   - Operations on the record that cannot proceed        │
//! │  └── Violation   - A rule rejected a field, row or the whole record    │
//! │                                                                         │
//! │  goldloan-store errors (separate crate)                                │
//! │  └── StoreError  - Storage, config and submission failures             │
//! │                                                                         │
//! │  Flow: Violation → ValidationReport → StoreError::SubmissionRejected   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Violation` is not a failure of the program. It is data: the form keeps
//! accepting edits while violations are outstanding, and only submission is
//! blocked by them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by operations on an [`ApplicationData`](crate::ApplicationData).
#[derive(Debug, Error)]
pub enum CoreError {
    /// An edit addressed an ornament row that does not exist.
    ///
    /// ## When This Occurs
    /// - Removing a row that was already removed
    /// - A stale row index arriving after the list shrank
    #[error("Ornament row {index} out of range (rows: {len})")]
    RowOutOfRange { index: usize, len: usize },

    /// The record could not be encoded or decoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// =============================================================================
// Violation
// =============================================================================

/// A named rule violation.
///
/// The serialized form is the violation tag the browser form displays
/// (`invalidAadhar`, `stoneExceedsGross`, ...).
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum Violation {
    /// Value is blank.
    #[serde(rename = "required")]
    #[error("value is required")]
    Required,

    /// A mandatory attestation is not ticked.
    #[serde(rename = "requiredTrue")]
    #[error("must be confirmed")]
    RequiredTrue,

    /// Value is shorter than the minimum length.
    #[serde(rename = "minlength")]
    #[error("must be at least {min} characters")]
    MinLength { min: usize },

    /// Value does not match the field's character pattern.
    #[serde(rename = "pattern")]
    #[error("has invalid characters")]
    Pattern,

    /// Value is not an email address.
    #[serde(rename = "email")]
    #[error("is not a valid email address")]
    Email,

    /// Numeric value is below the minimum.
    #[serde(rename = "min")]
    #[error("must be at least {min}")]
    Min { min: u64 },

    /// Numeric value is above the maximum.
    #[serde(rename = "max")]
    #[error("must be at most {max}")]
    Max { max: u64 },

    /// Not a 12 digit Aadhar number starting with 2-9.
    #[serde(rename = "invalidAadhar")]
    #[error("is not a valid Aadhar number")]
    InvalidAadhar,

    /// Not a PAN of the form AAAAA9999A.
    #[serde(rename = "invalidPan")]
    #[error("is not a valid PAN")]
    InvalidPan,

    /// Not a 10 digit mobile number starting with 6-9.
    #[serde(rename = "invalidPhone")]
    #[error("is not a valid mobile number")]
    InvalidPhone,

    /// Contains something other than digits.
    #[serde(rename = "nonNumeric")]
    #[error("must contain digits only")]
    NonNumeric,

    /// Not a decimal with at most two fractional digits.
    #[serde(rename = "invalidDecimal")]
    #[error("must be a number with at most 2 decimal places")]
    InvalidDecimal,

    /// Stone weight is larger than gross weight.
    #[serde(rename = "stoneExceedsGross")]
    #[error("stone weight exceeds gross weight")]
    StoneExceedsGross,

    /// Net weight of all ornaments is above the ceiling.
    #[serde(rename = "totalNetExceeded")]
    #[error("total net weight exceeds {} g", crate::MAX_TOTAL_NET_WEIGHT)]
    TotalNetExceeded,

    /// Net weight of coins is above the ceiling.
    #[serde(rename = "coinsExceeded")]
    #[error("coins net weight exceeds {} g", crate::MAX_COINS_NET_WEIGHT)]
    CoinsExceeded,
}

impl Violation {
    /// Returns the violation tag shown next to the field.
    pub fn tag(&self) -> &'static str {
        match self {
            Violation::Required => "required",
            Violation::RequiredTrue => "requiredTrue",
            Violation::MinLength { .. } => "minlength",
            Violation::Pattern => "pattern",
            Violation::Email => "email",
            Violation::Min { .. } => "min",
            Violation::Max { .. } => "max",
            Violation::InvalidAadhar => "invalidAadhar",
            Violation::InvalidPan => "invalidPan",
            Violation::InvalidPhone => "invalidPhone",
            Violation::NonNumeric => "nonNumeric",
            Violation::InvalidDecimal => "invalidDecimal",
            Violation::StoneExceedsGross => "stoneExceedsGross",
            Violation::TotalNetExceeded => "totalNetExceeded",
            Violation::CoinsExceeded => "coinsExceeded",
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
