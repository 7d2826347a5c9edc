//! # goldloan-core: Pure Business Logic for Gold Loan Intake
//!
//! Validation rules, the application record, the loan derivation and the
//! certificate reduction. Nothing in this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Gold Loan Intake Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    goldloan CLI                                 │   │
//! │  │    import ──► show ──► validate ──► submit ──► certificate      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               goldloan-store (I/O)                              │   │
//! │  │    Storage port, ApplicationSlot, FormSession, autosave task    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ goldloan-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌─────────────┐  ┌──────────┐  ┌────────────┐ │   │
//! │  │   │   types   │  │ calculation │  │  report  │  │ certificate│ │   │
//! │  │   │ Borrower  │  │  NetGold    │  │ FieldPath│  │  totals    │ │   │
//! │  │   │ Ornament  │  │  LTV        │  │ Violation│  │            │ │   │
//! │  │   └───────────┘  └─────────────┘  └──────────┘  └────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO CLOCK • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - The application record and its sections
//! - [`validation`] - Field, row and aggregate rules
//! - [`calculation`] - Net weight, 22 karat equivalent and loan figures
//! - [`report`] - Whole-record validation with field paths
//! - [`edit`] - User actions as values
//! - [`certificate`] - Reduction of a stored record for printing
//! - [`numeric`] - Lenient number parsing and fixed-point formatting
//! - [`error`] - Error and violation types
//!
//! ## Example Usage
//!
//! ```rust
//! use goldloan_core::{validate_application, ApplicationData, Edit};
//! use goldloan_core::report::OrnamentField;
//!
//! let app = ApplicationData::new()
//!     .apply(Edit::SetOrnament { index: 0, field: OrnamentField::GrossWeight, value: "10".into() })
//!     .and_then(|a| a.apply(Edit::SetOrnament { index: 0, field: OrnamentField::StoneWeight, value: "2".into() }))
//!     .and_then(|a| a.apply(Edit::SetOrnament { index: 0, field: OrnamentField::Purity, value: "22".into() }))
//!     .and_then(|a| a.apply(Edit::SetOrnament { index: 0, field: OrnamentField::MarketValue, value: "5000".into() }))
//!     .unwrap();
//!
//! assert_eq!(app.ornaments[0].net_gold, "8.00");
//! assert_eq!(app.calculation_section.eligible_loan, 30000.0);
//!
//! // Borrower details are still blank
//! assert!(!validate_application(&app).is_valid());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculation;
pub mod certificate;
pub mod edit;
pub mod error;
pub mod numeric;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculation::CalculationSection;
pub use certificate::{Certificate, CertificateRow};
pub use edit::{Edit, FileRef};
pub use error::{CoreError, CoreResult, Violation};
pub use report::{validate_application, FieldPath, FieldViolation, ValidationReport};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key of the application record.
pub const APPLICATION_SLOT_KEY: &str = "ApplicationData";

/// Notice shown when a submission is blocked by violations.
pub const SUBMIT_REJECTED_NOTICE: &str = "Please fix the validation errors before submitting.";

/// Ceiling on the summed net weight of all ornaments (g).
pub const MAX_TOTAL_NET_WEIGHT: f64 = 1000.0;

/// Ceiling on the summed net weight of coins (g).
pub const MAX_COINS_NET_WEIGHT: f64 = 50.0;

/// Upper bound of the 22 karat equivalent weight a loan is granted on (g).
pub const MAX_ELIGIBLE_WEIGHT: f64 = 500.0;

/// Karat basis the equivalent weight is normalized to.
pub const PURITY_BASIS_KARAT: f64 = 22.0;

/// Loan-to-value percentage used when none is given.
pub const DEFAULT_LTV_RATIO: f64 = 75.0;

/// `DEFAULT_LTV_RATIO` as the form shows it.
pub const DEFAULT_LTV_TEXT: &str = "75";

/// Category label that counts towards the coins ceiling (compared lowercase).
pub const COINS_CATEGORY: &str = "coins";

pub const MIN_FULL_NAME_LEN: usize = 4;

pub const MIN_ANNUAL_INCOME: u64 = 1;
pub const MAX_ANNUAL_INCOME: u64 = 1_000_000;
