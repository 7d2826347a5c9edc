//! # Certificate
//!
//! Read-only view of a persisted application, shaped for the printed
//! appraisal certificate.
//!
//! The certificate is built from the stored document alone. It never
//! writes back, and it tolerates documents the form would not produce:
//! missing sections, numbers stored as numbers, unreadable values.
//!
//! ```text
//! stored document ──► Certificate
//!                     ├── borrower                 (as stored)
//!                     ├── rows[]                   (numeric columns, bad → 0)
//!                     ├── loan_summary             (as stored)
//!                     ├── calculation              (as stored)
//!                     └── total_*()                (column sums)
//! ```

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::calculation::CalculationSection;
use crate::numeric::number_or_zero;
use crate::types::{Borrower, LoanCalculationSummary};

/// One line of the certificate's ornament table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRow {
    pub gold_items: String,
    pub gross_weight: f64,
    pub stone_weight: f64,
    pub net_weight: f64,
    pub purity: f64,
    pub equivalent_weight: f64,
    /// The record's 22 karat gold rate, repeated on every line.
    pub rate: f64,
    pub market_value: f64,
    pub hallmark: String,
}

/// The reduced certificate data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub borrower: Borrower,
    pub rows: Vec<CertificateRow>,
    pub loan_summary: LoanCalculationSummary,
    pub calculation: CalculationSection,
    /// When the certificate was printed. Not part of the stored record.
    pub issued_at: Option<DateTime<Utc>>,
}

impl Certificate {
    /// Reduces a stored document.
    ///
    /// Returns `None` when the text is not a JSON object.
    ///
    /// ## Example
    /// ```rust
    /// use goldloan_core::Certificate;
    ///
    /// let doc = r#"{"ornaments":[{"GrossWeight":"5"},{"GrossWeight":"7"}]}"#;
    /// let certificate = Certificate::from_document(doc).unwrap();
    /// assert_eq!(certificate.total_gross_weight(), 12.0);
    ///
    /// assert!(Certificate::from_document("not json").is_none());
    /// ```
    pub fn from_document(document: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(document).ok()?;
        let root = value.as_object()?;

        let loan_summary: LoanCalculationSummary = section(root.get("LoanCalculationSummary"));
        let rate = root
            .get("LoanCalculationSummary")
            .and_then(|summary| summary.get("goldRate22K"))
            .map_or(0.0, number_of);

        let rows = root
            .get("ornaments")
            .and_then(Value::as_array)
            .map(|rows| rows.iter().map(|row| reduce_row(row, rate)).collect())
            .unwrap_or_default();

        Some(Certificate {
            borrower: section(root.get("borrower")),
            rows,
            loan_summary,
            calculation: section(root.get("calculationsection")),
            issued_at: None,
        })
    }

    /// Stamps the print time.
    pub fn issued(self, at: DateTime<Utc>) -> Self {
        Certificate {
            issued_at: Some(at),
            ..self
        }
    }

    pub fn total_gross_weight(&self) -> f64 {
        self.rows.iter().map(|r| r.gross_weight).sum()
    }

    pub fn total_stone_weight(&self) -> f64 {
        self.rows.iter().map(|r| r.stone_weight).sum()
    }

    pub fn total_net_weight(&self) -> f64 {
        self.rows.iter().map(|r| r.net_weight).sum()
    }

    pub fn total_equivalent_weight(&self) -> f64 {
        self.rows.iter().map(|r| r.equivalent_weight).sum()
    }

    pub fn total_market_value(&self) -> f64 {
        self.rows.iter().map(|r| r.market_value).sum()
    }
}

/// Decodes a stored section, falling back to its default when it is
/// missing or does not fit the shape.
fn section<T: DeserializeOwned + Default>(value: Option<&Value>) -> T {
    value
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// Reads a stored scalar as a number. Anything unreadable is zero.
fn number_of(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => number_or_zero(s),
        _ => 0.0,
    }
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn reduce_row(row: &Value, rate: f64) -> CertificateRow {
    let number = |key: &str| row.get(key).map_or(0.0, number_of);

    CertificateRow {
        gold_items: text_of(row.get("goldItems")),
        gross_weight: number("GrossWeight"),
        stone_weight: number("StoneWeight"),
        net_weight: number("NetGold"),
        purity: number("Purity"),
        equivalent_weight: number("EquivalentWeight"),
        rate,
        market_value: number("MarketValue"),
        hallmark: text_of(row.get("Hallmark")),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApplicationData, OrnamentRow};
    use chrono::TimeZone;

    #[test]
    fn test_totals_from_stored_record() {
        let app = ApplicationData::new()
            .with_ornaments(vec![
                OrnamentRow::new()
                    .with_gross_weight("5")
                    .with_stone_weight("1")
                    .with_purity("22")
                    .with_market_value("100"),
                OrnamentRow::new()
                    .with_gross_weight("7")
                    .with_purity("18")
                    .with_market_value("200"),
            ])
            .with_loan_calculation_summary(LoanCalculationSummary::default().with_gold_rate("6100"));

        let certificate = Certificate::from_document(&app.to_document().unwrap()).unwrap();

        assert_eq!(certificate.rows.len(), 2);
        assert_eq!(certificate.total_gross_weight(), 12.0);
        assert_eq!(certificate.total_stone_weight(), 1.0);
        assert_eq!(certificate.total_net_weight(), 11.0);
        assert_eq!(certificate.total_market_value(), 300.0);
        assert!(certificate.rows.iter().all(|r| r.rate == 6100.0));
        assert_eq!(certificate.calculation, app.calculation_section);
    }

    #[test]
    fn test_lenient_rows() {
        let doc = r#"{
            "ornaments": [
                {"goldItems": "ring", "GrossWeight": 5, "Purity": "n/a", "Hallmark": null},
                {"GrossWeight": "7g"},
                "garbage"
            ]
        }"#;

        let certificate = Certificate::from_document(doc).unwrap();
        assert_eq!(certificate.rows.len(), 3);
        assert_eq!(certificate.total_gross_weight(), 12.0);
        assert_eq!(certificate.rows[0].purity, 0.0);
        assert_eq!(certificate.rows[0].hallmark, "");
        assert_eq!(certificate.rows[2].gross_weight, 0.0);
        assert_eq!(certificate.rows[0].rate, 0.0);
    }

    #[test]
    fn test_unusable_documents() {
        assert!(Certificate::from_document("").is_none());
        assert!(Certificate::from_document("[1, 2]").is_none());
        assert!(Certificate::from_document("{").is_none());

        let empty = Certificate::from_document("{}").unwrap();
        assert!(empty.rows.is_empty());
        assert_eq!(empty.total_market_value(), 0.0);
    }

    #[test]
    fn test_issued_stamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        let certificate = Certificate::from_document("{}").unwrap().issued(at);
        assert_eq!(certificate.issued_at, Some(at));
    }
}
