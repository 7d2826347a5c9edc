//! # Validation Report
//!
//! Runs every rule against a whole [`ApplicationData`] and collects the
//! violations, each tagged with the field it belongs to.
//!
//! ## Rule Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Field                       Rules (in order)                           │
//! │  ───────────────────────     ─────────────────────────────────────────  │
//! │  borrower.FullName           required, minlength 4, pattern             │
//! │  borrower.Pan                required, invalidPan                       │
//! │  borrower.AadharNumber       required, invalidAadhar                    │
//! │  borrower.Mobile             required, invalidPhone                     │
//! │  borrower.Email              required, email                            │
//! │  borrower.AnnualIncome       required, nonNumeric, min 1, max 1e6       │
//! │  ornaments[i].goldItems      required                                   │
//! │  ornaments[i].GrossWeight    required, invalidDecimal                   │
//! │  ornaments[i].StoneWeight    required, invalidDecimal                   │
//! │  ornaments[i].Purity         required, invalidDecimal                   │
//! │  ornaments[i].MarketValue    required, nonNumeric                       │
//! │  ornaments[i].Hallmark       required, pattern                          │
//! │  ornaments[i]                stoneExceedsGross                          │
//! │  ownership.ownershipProof    required                                   │
//! │  ownership.declaration       requiredTrue                               │
//! │  LoanCalculationSummary.*    goldRate22K required + invalidDecimal,     │
//! │                              ltvRatio required                          │
//! │  RegulatoryCompliance.*      requiredTrue (each)                        │
//! │  record                      totalNetExceeded, coinsExceeded            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A field reports at most one violation: the first rule that fails. A blank
//! required field therefore shows `required`, never a format tag.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Violation;
use crate::types::{ApplicationData, OrnamentRow};
use crate::validation::{
    validate_aadhar, validate_annual_income, validate_coins_ceiling, validate_decimal,
    validate_digits, validate_email, validate_full_name, validate_hallmark, validate_pan,
    validate_phone, validate_required, validate_required_true, validate_stone_vs_gross,
    validate_weight_ceiling, ValidationResult,
};

// =============================================================================
// Field Names
// =============================================================================

/// Borrower section fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorrowerField {
    FullName,
    Pan,
    AadharNumber,
    Mobile,
    Email,
    AnnualIncome,
}

impl BorrowerField {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowerField::FullName => "FullName",
            BorrowerField::Pan => "Pan",
            BorrowerField::AadharNumber => "AadharNumber",
            BorrowerField::Mobile => "Mobile",
            BorrowerField::Email => "Email",
            BorrowerField::AnnualIncome => "AnnualIncome",
        }
    }
}

/// Editable ornament row fields. The derived fields are not listed: they
/// cannot be edited and have no rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrnamentField {
    GoldItems,
    GrossWeight,
    StoneWeight,
    Purity,
    MarketValue,
    Hallmark,
    Description,
}

impl OrnamentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrnamentField::GoldItems => "goldItems",
            OrnamentField::GrossWeight => "GrossWeight",
            OrnamentField::StoneWeight => "StoneWeight",
            OrnamentField::Purity => "Purity",
            OrnamentField::MarketValue => "MarketValue",
            OrnamentField::Hallmark => "Hallmark",
            OrnamentField::Description => "Description",
        }
    }
}

/// Ownership section fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnershipField {
    OwnershipProof,
    OwnershipDeclaration,
}

impl OwnershipField {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnershipField::OwnershipProof => "ownershipProof",
            OwnershipField::OwnershipDeclaration => "ownershipDeclaration",
        }
    }
}

/// Loan calculation summary fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanField {
    GoldRate22K,
    LtvRatio,
}

impl LoanField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanField::GoldRate22K => "goldRate22K",
            LoanField::LtvRatio => "ltvRatio",
        }
    }
}

/// Regulatory compliance attestations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceField {
    RbiCompliance,
    BorrowerPresent,
    MoneyLaunderingCheck,
}

impl ComplianceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceField::RbiCompliance => "rbiCompliance",
            ComplianceField::BorrowerPresent => "borrowerPresent",
            ComplianceField::MoneyLaunderingCheck => "moneyLaunderingCheck",
        }
    }
}

// =============================================================================
// Field Path
// =============================================================================

/// Where in the record a violation was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPath {
    Borrower(BorrowerField),
    /// A row field, or the row as a whole when `field` is `None`.
    Ornament {
        index: usize,
        field: Option<OrnamentField>,
    },
    Ownership(OwnershipField),
    Loan(LoanField),
    Compliance(ComplianceField),
    /// The whole record (aggregate rules).
    Record,
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Borrower(field) => write!(f, "borrower.{}", field.as_str()),
            FieldPath::Ornament {
                index,
                field: Some(field),
            } => write!(f, "ornaments[{}].{}", index, field.as_str()),
            FieldPath::Ornament { index, field: None } => write!(f, "ornaments[{}]", index),
            FieldPath::Ownership(field) => write!(f, "ownership.{}", field.as_str()),
            FieldPath::Loan(field) => write!(f, "LoanCalculationSummary.{}", field.as_str()),
            FieldPath::Compliance(field) => write!(f, "RegulatoryCompliance.{}", field.as_str()),
            FieldPath::Record => write!(f, "record"),
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// One rule failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub path: FieldPath,
    pub violation: Violation,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.violation, self.violation.tag())
    }
}

/// Every violation in a record, in form order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<FieldViolation>,
}

impl ValidationReport {
    /// True when the record may be submitted.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violation reported for `path`, if any.
    pub fn violation_at(&self, path: FieldPath) -> Option<&Violation> {
        self.violations
            .iter()
            .find(|v| v.path == path)
            .map(|v| &v.violation)
    }

    /// True if any entry carries `violation`.
    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.iter().any(|v| &v.violation == violation)
    }

    fn check(&mut self, path: FieldPath, rules: &[&dyn Fn() -> ValidationResult]) {
        if let Some(violation) = rules.iter().find_map(|rule| rule().err()) {
            self.violations.push(FieldViolation { path, violation });
        }
    }
}

// =============================================================================
// Record Validation
// =============================================================================

/// Validates the whole record.
///
/// ## Example
/// ```rust
/// use goldloan_core::{validate_application, ApplicationData, FieldPath, Violation};
/// use goldloan_core::report::BorrowerField;
///
/// let report = validate_application(&ApplicationData::new());
/// assert!(!report.is_valid());
/// assert_eq!(
///     report.violation_at(FieldPath::Borrower(BorrowerField::Pan)),
///     Some(&Violation::Required)
/// );
/// ```
pub fn validate_application(app: &ApplicationData) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_borrower(&mut report, app);

    for (index, row) in app.ornaments.iter().enumerate() {
        check_ornament(&mut report, index, row);
    }

    let ownership = &app.ownership;
    report.check(
        FieldPath::Ownership(OwnershipField::OwnershipProof),
        &[&|| validate_required(&ownership.ownership_proof)],
    );
    report.check(
        FieldPath::Ownership(OwnershipField::OwnershipDeclaration),
        &[&|| validate_required_true(ownership.ownership_declaration)],
    );

    let loan = &app.loan_calculation_summary;
    report.check(
        FieldPath::Loan(LoanField::GoldRate22K),
        &[
            &|| validate_required(&loan.gold_rate_22k),
            &|| validate_decimal(&loan.gold_rate_22k),
        ],
    );
    report.check(
        FieldPath::Loan(LoanField::LtvRatio),
        &[&|| validate_required(&loan.ltv_ratio)],
    );

    let compliance = &app.regulatory_compliance;
    for (field, value) in [
        (ComplianceField::RbiCompliance, compliance.rbi_compliance),
        (ComplianceField::BorrowerPresent, compliance.borrower_present),
        (
            ComplianceField::MoneyLaunderingCheck,
            compliance.money_laundering_check,
        ),
    ] {
        report.check(
            FieldPath::Compliance(field),
            &[&|| validate_required_true(value)],
        );
    }

    // Both ceilings may fail at once, so they are not chained
    report.check(FieldPath::Record, &[&|| validate_weight_ceiling(&app.ornaments)]);
    report.check(FieldPath::Record, &[&|| validate_coins_ceiling(&app.ornaments)]);

    report
}

fn check_borrower(report: &mut ValidationReport, app: &ApplicationData) {
    let b = &app.borrower;
    let path = FieldPath::Borrower;

    report.check(
        path(BorrowerField::FullName),
        &[
            &|| validate_required(&b.full_name),
            &|| validate_full_name(&b.full_name),
        ],
    );
    report.check(
        path(BorrowerField::Pan),
        &[&|| validate_required(&b.pan), &|| validate_pan(&b.pan)],
    );
    report.check(
        path(BorrowerField::AadharNumber),
        &[
            &|| validate_required(&b.aadhar_number),
            &|| validate_aadhar(&b.aadhar_number),
        ],
    );
    report.check(
        path(BorrowerField::Mobile),
        &[&|| validate_required(&b.mobile), &|| validate_phone(&b.mobile)],
    );
    report.check(
        path(BorrowerField::Email),
        &[&|| validate_required(&b.email), &|| validate_email(&b.email)],
    );
    report.check(
        path(BorrowerField::AnnualIncome),
        &[
            &|| validate_required(&b.annual_income),
            &|| validate_annual_income(&b.annual_income),
        ],
    );
}

fn check_ornament(report: &mut ValidationReport, index: usize, row: &OrnamentRow) {
    let path = |field| FieldPath::Ornament {
        index,
        field: Some(field),
    };

    report.check(
        path(OrnamentField::GoldItems),
        &[&|| validate_required(&row.gold_items)],
    );
    report.check(
        path(OrnamentField::GrossWeight),
        &[
            &|| validate_required(&row.gross_weight),
            &|| validate_decimal(&row.gross_weight),
        ],
    );
    report.check(
        path(OrnamentField::StoneWeight),
        &[
            &|| validate_required(&row.stone_weight),
            &|| validate_decimal(&row.stone_weight),
        ],
    );
    report.check(
        path(OrnamentField::Purity),
        &[
            &|| validate_required(&row.purity),
            &|| validate_decimal(&row.purity),
        ],
    );
    report.check(
        path(OrnamentField::MarketValue),
        &[
            &|| validate_required(&row.market_value),
            &|| validate_digits(&row.market_value),
        ],
    );
    report.check(
        path(OrnamentField::Hallmark),
        &[
            &|| validate_required(&row.hallmark),
            &|| validate_hallmark(&row.hallmark),
        ],
    );
    report.check(
        FieldPath::Ornament { index, field: None },
        &[&|| validate_stone_vs_gross(&row.gross_weight, &row.stone_weight)],
    );
}

// =============================================================================
// Unit Tests
// =============================================================================
