//! # Domain Types
//!
//! The gold loan application record and its sections.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ApplicationData                                 │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Borrower     │   │  OrnamentRow[]  │   │    Ownership    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  FullName       │   │  goldItems      │   │  proof          │       │
//! │  │  Pan (upper)    │   │  Gross/Stone    │   │  document name  │       │
//! │  │  AadharNumber   │   │  NetGold*       │   │  declaration    │       │
//! │  │  Mobile, Email  │   │  Purity         │   └─────────────────┘       │
//! │  │  AnnualIncome   │   │  EquivalentWt*  │                              │
//! │  └─────────────────┘   │  MarketValue    │   ┌─────────────────┐       │
//! │                        │  Hallmark, ...  │   │ LoanCalculation │       │
//! │  ┌─────────────────┐   └─────────────────┘   │ Summary         │       │
//! │  │ Regulatory      │                         │  goldRate22K    │       │
//! │  │ Compliance      │   ┌─────────────────┐   │  ltvRatio (75)  │       │
//! │  │  3 attestations │   │ calculation     │   └─────────────────┘       │
//! │  └─────────────────┘   │ section*        │                              │
//! │                        └─────────────────┘   * derived, read-only      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Raw Text Fields
//! Inputs are kept as the text the user typed. A half-typed `"12."` is a
//! legitimate intermediate state of a form field; rules report on it, the
//! derivation reads it leniently, and nothing is lost by storing it.
//!
//! ## Immutable Updates
//! Every section is a plain value. Changes go through `with_*` methods that
//! consume the value and return the updated one, so derived fields can never
//! be left stale by a partial update.
//!
//! ## Wire Names
//! Field names in the persisted JSON are the ones the browser form uses
//! (`FullName`, `goldItems`, `goldRate22K`, `calculationsection`, ...), so a
//! document written by either side reads back on the other.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::calculation::{CalculationSection, RowFigures};
use crate::validation::normalize_pan;
use crate::DEFAULT_LTV_TEXT;

// =============================================================================
// Lenient Text Fields
// =============================================================================

/// Reads a text field that older documents may have stored as a number,
/// boolean or null.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        Some(Raw::Flag(b)) => b.to_string(),
        None => String::new(),
    })
}

/// Reads a flag stored as `null` as unset.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Reads an ornament list stored as `null` the same as a missing one.
fn lenient_rows<'de, D>(deserializer: D) -> Result<Vec<OrnamentRow>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<OrnamentRow>>::deserialize(deserializer)?
        .unwrap_or_else(|| vec![OrnamentRow::new()]))
}

// =============================================================================
// Borrower
// =============================================================================

/// Borrower KYC details.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "PascalCase", default)]
pub struct Borrower {
    /// Letters and spaces, at least four characters.
    #[serde(deserialize_with = "lenient_text")]
    pub full_name: String,

    /// Permanent Account Number, always stored upper-case.
    #[serde(deserialize_with = "lenient_text")]
    pub pan: String,

    /// 12 digit Aadhar number.
    #[serde(deserialize_with = "lenient_text")]
    pub aadhar_number: String,

    /// 10 digit mobile number.
    #[serde(deserialize_with = "lenient_text")]
    pub mobile: String,

    #[serde(deserialize_with = "lenient_text")]
    pub email: String,

    /// Whole rupees, 1 to 1,000,000.
    #[serde(deserialize_with = "lenient_text")]
    pub annual_income: String,
}

impl Borrower {
    pub fn with_full_name(self, value: impl Into<String>) -> Self {
        Borrower {
            full_name: value.into(),
            ..self
        }
    }

    /// Sets the PAN, upper-casing it on the way in.
    ///
    /// ## Example
    /// ```rust
    /// use goldloan_core::Borrower;
    ///
    /// let borrower = Borrower::default().with_pan("abcde1234f");
    /// assert_eq!(borrower.pan, "ABCDE1234F");
    /// ```
    pub fn with_pan(self, value: &str) -> Self {
        Borrower {
            pan: normalize_pan(value),
            ..self
        }
    }

    pub fn with_aadhar_number(self, value: impl Into<String>) -> Self {
        Borrower {
            aadhar_number: value.into(),
            ..self
        }
    }

    pub fn with_mobile(self, value: impl Into<String>) -> Self {
        Borrower {
            mobile: value.into(),
            ..self
        }
    }

    pub fn with_email(self, value: impl Into<String>) -> Self {
        Borrower {
            email: value.into(),
            ..self
        }
    }

    pub fn with_annual_income(self, value: impl Into<String>) -> Self {
        Borrower {
            annual_income: value.into(),
            ..self
        }
    }

    /// Re-applies input normalization to a borrower read from storage.
    pub fn normalized(self) -> Self {
        let pan = self.pan.clone();
        self.with_pan(&pan)
    }
}

// =============================================================================
// Ornament Row
// =============================================================================

/// One physical gold item brought in as collateral.
///
/// `NetGold` and `EquivalentWeight` are derived. Every `with_*` method that
/// touches an input recomputes them, so a row built through this API is
/// always consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrnamentRow {
    /// Category label ("chain", "ring", "coins", ...).
    #[serde(rename = "goldItems")]
    #[serde(deserialize_with = "lenient_text")]
    pub gold_items: String,

    /// Grams, including stones.
    #[serde(deserialize_with = "lenient_text")]
    pub gross_weight: String,

    /// Grams of embedded stones.
    #[serde(deserialize_with = "lenient_text")]
    pub stone_weight: String,

    /// Derived: gross − stone, two decimals.
    #[serde(deserialize_with = "lenient_text")]
    pub net_gold: String,

    /// Karat value.
    #[serde(deserialize_with = "lenient_text")]
    pub purity: String,

    /// Derived: net gold on a 22 karat basis, four decimals.
    #[serde(deserialize_with = "lenient_text")]
    pub equivalent_weight: String,

    /// Rate per gram of 22 karat equivalent.
    #[serde(deserialize_with = "lenient_text")]
    pub market_value: String,

    /// Purity certification code.
    #[serde(deserialize_with = "lenient_text")]
    pub hallmark: String,

    #[serde(deserialize_with = "lenient_text")]
    pub description: String,

    /// Names of attached photos. Only names are ever stored.
    pub images: Option<Vec<String>>,
}

impl Default for OrnamentRow {
    fn default() -> Self {
        OrnamentRow::new()
    }
}

impl OrnamentRow {
    /// Creates a blank row with its derived fields filled in.
    pub fn new() -> Self {
        OrnamentRow {
            gold_items: String::new(),
            gross_weight: String::new(),
            stone_weight: String::new(),
            net_gold: String::new(),
            purity: String::new(),
            equivalent_weight: String::new(),
            market_value: String::new(),
            hallmark: String::new(),
            description: String::new(),
            images: None,
        }
        .recalculated()
    }

    /// Returns the row with `NetGold` and `EquivalentWeight` recomputed from
    /// its inputs.
    pub fn recalculated(self) -> Self {
        let figures = RowFigures::of(&self);
        OrnamentRow {
            net_gold: figures.net_gold_text(),
            equivalent_weight: figures.equivalent_weight_text(),
            ..self
        }
    }

    pub fn with_gold_items(self, value: impl Into<String>) -> Self {
        OrnamentRow {
            gold_items: value.into(),
            ..self
        }
    }

    pub fn with_gross_weight(self, value: impl Into<String>) -> Self {
        OrnamentRow {
            gross_weight: value.into(),
            ..self
        }
        .recalculated()
    }

    pub fn with_stone_weight(self, value: impl Into<String>) -> Self {
        OrnamentRow {
            stone_weight: value.into(),
            ..self
        }
        .recalculated()
    }

    pub fn with_purity(self, value: impl Into<String>) -> Self {
        OrnamentRow {
            purity: value.into(),
            ..self
        }
        .recalculated()
    }

    pub fn with_market_value(self, value: impl Into<String>) -> Self {
        OrnamentRow {
            market_value: value.into(),
            ..self
        }
    }

    pub fn with_hallmark(self, value: impl Into<String>) -> Self {
        OrnamentRow {
            hallmark: value.into(),
            ..self
        }
    }

    pub fn with_description(self, value: impl Into<String>) -> Self {
        OrnamentRow {
            description: value.into(),
            ..self
        }
    }

    /// Replaces the attached photo names. An empty selection clears them.
    pub fn with_images(self, names: Vec<String>) -> Self {
        OrnamentRow {
            images: if names.is_empty() { None } else { Some(names) },
            ..self
        }
    }

    /// Derived figures as numbers.
    pub fn figures(&self) -> RowFigures {
        RowFigures::of(self)
    }
}

// =============================================================================
// Ownership
// =============================================================================

/// How the borrower shows the items are theirs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Ownership {
    /// Kind of proof offered (purchase bill, inheritance, ...).
    #[serde(deserialize_with = "lenient_text")]
    pub ownership_proof: String,

    /// File name of the uploaded proof document.
    pub ownership_document: Option<String>,

    /// Borrower's declaration of ownership. Must be true to submit.
    #[serde(deserialize_with = "lenient_flag")]
    pub ownership_declaration: bool,
}

impl Ownership {
    pub fn with_proof(self, value: impl Into<String>) -> Self {
        Ownership {
            ownership_proof: value.into(),
            ..self
        }
    }

    pub fn with_document(self, name: Option<String>) -> Self {
        Ownership {
            ownership_document: name,
            ..self
        }
    }

    pub fn with_declaration(self, value: bool) -> Self {
        Ownership {
            ownership_declaration: value,
            ..self
        }
    }
}

// =============================================================================
// Loan Calculation Summary
// =============================================================================

/// Loan parameters entered by the appraiser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanCalculationSummary {
    /// Rate per gram of 22 karat gold.
    #[serde(rename = "goldRate22K")]
    #[serde(deserialize_with = "lenient_text")]
    pub gold_rate_22k: String,

    /// Loan-to-value percentage.
    #[serde(deserialize_with = "lenient_text")]
    pub ltv_ratio: String,
}

impl Default for LoanCalculationSummary {
    fn default() -> Self {
        LoanCalculationSummary {
            gold_rate_22k: String::new(),
            ltv_ratio: DEFAULT_LTV_TEXT.to_string(),
        }
    }
}

impl LoanCalculationSummary {
    pub fn with_gold_rate(self, value: impl Into<String>) -> Self {
        LoanCalculationSummary {
            gold_rate_22k: value.into(),
            ..self
        }
    }

    pub fn with_ltv_ratio(self, value: impl Into<String>) -> Self {
        LoanCalculationSummary {
            ltv_ratio: value.into(),
            ..self
        }
    }
}

// =============================================================================
// Regulatory Compliance
// =============================================================================

/// Attestations the branch makes for every loan. All start confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct RegulatoryCompliance {
    /// Loan follows the central bank's gold loan directions.
    pub rbi_compliance: bool,
    /// Borrower was present in person.
    pub borrower_present: bool,
    /// Anti money laundering check done.
    pub money_laundering_check: bool,
}

impl Default for RegulatoryCompliance {
    fn default() -> Self {
        RegulatoryCompliance {
            rbi_compliance: true,
            borrower_present: true,
            money_laundering_check: true,
        }
    }
}

// =============================================================================
// Application Data
// =============================================================================

/// The complete application record. This is what the storage slot holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ApplicationData {
    pub borrower: Borrower,

    /// Items in the order the user entered them.
    #[serde(deserialize_with = "lenient_rows")]
    pub ornaments: Vec<OrnamentRow>,

    pub ownership: Ownership,

    #[serde(rename = "LoanCalculationSummary")]
    pub loan_calculation_summary: LoanCalculationSummary,

    #[serde(rename = "RegulatoryCompliance")]
    pub regulatory_compliance: RegulatoryCompliance,

    /// Snapshot of the derived loan figures.
    #[serde(rename = "calculationsection")]
    pub calculation_section: CalculationSection,
}

impl Default for ApplicationData {
    fn default() -> Self {
        ApplicationData::new()
    }
}

impl ApplicationData {
    /// Creates a blank application with one blank ornament row.
    pub fn new() -> Self {
        ApplicationData {
            borrower: Borrower::default(),
            ornaments: vec![OrnamentRow::new()],
            ownership: Ownership::default(),
            loan_calculation_summary: LoanCalculationSummary::default(),
            regulatory_compliance: RegulatoryCompliance::default(),
            calculation_section: CalculationSection::default(),
        }
        .recalculated()
    }

    /// Recomputes every row's derived fields and the calculation section.
    ///
    /// Idempotent: calling it on its own output changes nothing.
    pub fn recalculated(self) -> Self {
        let ornaments: Vec<OrnamentRow> = self
            .ornaments
            .into_iter()
            .map(OrnamentRow::recalculated)
            .collect();
        let calculation_section =
            CalculationSection::compute(&ornaments, &self.loan_calculation_summary.ltv_ratio);

        ApplicationData {
            ornaments,
            calculation_section,
            ..self
        }
    }

    /// Prepares a record read from storage: normalizes inputs and
    /// recomputes everything derived.
    pub fn hydrated(self) -> Self {
        ApplicationData {
            borrower: self.borrower.clone().normalized(),
            ..self
        }
        .recalculated()
    }

    pub fn with_borrower(self, borrower: Borrower) -> Self {
        ApplicationData { borrower, ..self }
    }

    pub fn with_ornaments(self, ornaments: Vec<OrnamentRow>) -> Self {
        ApplicationData { ornaments, ..self }.recalculated()
    }

    pub fn with_ownership(self, ownership: Ownership) -> Self {
        ApplicationData { ownership, ..self }
    }

    pub fn with_loan_calculation_summary(self, summary: LoanCalculationSummary) -> Self {
        ApplicationData {
            loan_calculation_summary: summary,
            ..self
        }
        .recalculated()
    }

    pub fn with_regulatory_compliance(self, compliance: RegulatoryCompliance) -> Self {
        ApplicationData {
            regulatory_compliance: compliance,
            ..self
        }
    }

    /// Encodes the record as the persisted JSON document.
    pub fn to_document(&self) -> crate::CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a persisted document and hydrates it.
    pub fn from_document(document: &str) -> crate::CoreResult<Self> {
        let data: ApplicationData = serde_json::from_str(document)?;
        Ok(data.hydrated())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_application_has_one_blank_row() {
        let app = ApplicationData::new();
        assert_eq!(app.ornaments.len(), 1);
        assert_eq!(app.ornaments[0].net_gold, "0.00");
        assert_eq!(app.ornaments[0].equivalent_weight, "0");
        assert_eq!(app.loan_calculation_summary.ltv_ratio, "75");
        assert!(app.regulatory_compliance.rbi_compliance);
    }

    #[test]
    fn test_row_derived_fields_follow_inputs() {
        let row = OrnamentRow::new()
            .with_gross_weight("10")
            .with_stone_weight("2")
            .with_purity("22");
        assert_eq!(row.net_gold, "8.00");
        assert_eq!(row.equivalent_weight, "8.0000");

        let row = row.with_stone_weight("12");
        assert_eq!(row.net_gold, "0.00");
        assert_eq!(row.equivalent_weight, "0");
    }

    #[test]
    fn test_wire_names() {
        let app = ApplicationData::new()
            .with_borrower(Borrower::default().with_full_name("Ravi Kumar"));
        let json: serde_json::Value =
            serde_json::from_str(&app.to_document().unwrap()).unwrap();

        assert_eq!(json["borrower"]["FullName"], "Ravi Kumar");
        assert!(json["ornaments"][0].get("goldItems").is_some());
        assert!(json["ornaments"][0].get("GrossWeight").is_some());
        assert!(json["ornaments"][0].get("EquivalentWeight").is_some());
        assert!(json["ornaments"][0]["Images"].is_null());
        assert!(json["ownership"].get("ownershipDeclaration").is_some());
        assert_eq!(json["LoanCalculationSummary"]["ltvRatio"], "75");
        assert!(json["LoanCalculationSummary"].get("goldRate22K").is_some());
        assert!(json["calculationsection"].get("isWeightValid").is_some());
    }

    #[test]
    fn test_lenient_document_fields() {
        let doc = r#"{
            "borrower": { "FullName": "Ravi Kumar", "Pan": "abcde1234f", "AnnualIncome": 250000 },
            "ornaments": [ { "goldItems": "ring", "GrossWeight": 10, "StoneWeight": null, "Purity": "22" } ]
        }"#;

        let app = ApplicationData::from_document(doc).unwrap();
        assert_eq!(app.borrower.pan, "ABCDE1234F");
        assert_eq!(app.borrower.annual_income, "250000");
        assert_eq!(app.ornaments[0].gross_weight, "10");
        assert_eq!(app.ornaments[0].stone_weight, "");
        assert_eq!(app.ornaments[0].net_gold, "10.00");
        assert_eq!(app.loan_calculation_summary.ltv_ratio, "75");
        assert!(app.regulatory_compliance.money_laundering_check);
    }

    #[test]
    fn test_missing_sections_take_blank_defaults() {
        let app = ApplicationData::from_document("{}").unwrap();
        assert_eq!(app, ApplicationData::new());

        // An explicitly empty list stays empty
        let app = ApplicationData::from_document(r#"{"ornaments": []}"#).unwrap();
        assert!(app.ornaments.is_empty());
    }

    #[test]
    fn test_null_sections_read_as_unset() {
        let doc = r#"{
            "ornaments": null,
            "ownership": { "ownershipProof": "bill", "ownershipDeclaration": null }
        }"#;

        let app = ApplicationData::from_document(doc).unwrap();
        assert_eq!(app.ornaments, ApplicationData::new().ornaments);
        assert_eq!(app.ownership.ownership_proof, "bill");
        assert!(!app.ownership.ownership_declaration);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(ApplicationData::from_document("not json").is_err());
        assert!(ApplicationData::from_document("[1,2]").is_err());
    }

    #[test]
    fn test_recalculated_is_idempotent() {
        let app = ApplicationData::new().with_ornaments(vec![OrnamentRow::new()
            .with_gross_weight("12.35")
            .with_stone_weight("1.1")
            .with_purity("18")
            .with_market_value("6100")]);

        let again = app.clone().recalculated();
        assert_eq!(app, again);
        assert_eq!(app.to_document().unwrap(), again.to_document().unwrap());
    }
}
