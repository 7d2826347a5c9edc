//! # Edits
//!
//! Every change a user can make to the record, as a value.
//!
//! ```text
//! ┌────────────────────────┬───────────────┬──────────────────────────────┐
//! │ Edit                   │ Persisted     │ Recomputes                   │
//! ├────────────────────────┼───────────────┼──────────────────────────────┤
//! │ SetBorrower            │ after settle  │ -                            │
//! │ SetOrnament            │ after settle  │ row + section (input fields) │
//! │ AddOrnament            │ immediately   │ section                      │
//! │ RemoveOrnament         │ immediately   │ section                      │
//! │ AttachImages           │ immediately   │ -                            │
//! │ SetOwnershipProof      │ after settle  │ -                            │
//! │ SetOwnershipDocument   │ immediately   │ -                            │
//! │ SetOwnershipDeclaration│ after settle  │ -                            │
//! │ SetGoldRate            │ after settle  │ -                            │
//! │ SetLtvRatio            │ after settle  │ section                      │
//! │ SetCompliance          │ after settle  │ -                            │
//! └────────────────────────┴───────────────┴──────────────────────────────┘
//! ```
//!
//! File pickers hand over file handles; only the display name is kept
//! (see [`FileRef`]).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::report::{BorrowerField, ComplianceField, OrnamentField};
use crate::types::{ApplicationData, Borrower, OrnamentRow, RegulatoryCompliance};

// =============================================================================
// File References
// =============================================================================

/// Anything that can name a selected file.
pub trait FileRef {
    /// The name stored in the record.
    fn file_name(&self) -> String;
}

impl FileRef for Path {
    fn file_name(&self) -> String {
        Path::file_name(self)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.to_string_lossy().into_owned())
    }
}

impl FileRef for PathBuf {
    fn file_name(&self) -> String {
        FileRef::file_name(self.as_path())
    }
}

impl FileRef for str {
    fn file_name(&self) -> String {
        self.to_string()
    }
}

impl FileRef for String {
    fn file_name(&self) -> String {
        self.clone()
    }
}

impl<T: FileRef + ?Sized> FileRef for &T {
    fn file_name(&self) -> String {
        (**self).file_name()
    }
}

// =============================================================================
// Edit
// =============================================================================

/// A single user action on the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Edit {
    SetBorrower {
        field: BorrowerField,
        value: String,
    },
    SetOrnament {
        index: usize,
        field: OrnamentField,
        value: String,
    },
    AddOrnament,
    RemoveOrnament {
        index: usize,
    },
    /// Replaces a row's images. An empty list clears them.
    AttachImages {
        index: usize,
        names: Vec<String>,
    },
    SetOwnershipProof(String),
    SetOwnershipDocument(Option<String>),
    SetOwnershipDeclaration(bool),
    SetGoldRate(String),
    SetLtvRatio(String),
    SetCompliance {
        field: ComplianceField,
        value: bool,
    },
}

impl Edit {
    /// Attaches the names of `files` to row `index`.
    pub fn attach_images<F: FileRef>(index: usize, files: &[F]) -> Self {
        Edit::AttachImages {
            index,
            names: files.iter().map(FileRef::file_name).collect(),
        }
    }

    /// Sets the ownership document from a selected file, or clears it.
    pub fn ownership_document<F: FileRef + ?Sized>(file: Option<&F>) -> Self {
        Edit::SetOwnershipDocument(file.map(FileRef::file_name))
    }

    /// True for edits saved without waiting for the settle window.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Edit::AddOrnament
                | Edit::RemoveOrnament { .. }
                | Edit::AttachImages { .. }
                | Edit::SetOwnershipDocument(_)
        )
    }
}

// =============================================================================
// Applying Edits
// =============================================================================

impl ApplicationData {
    /// Applies `edit` and returns the updated record.
    ///
    /// ## Errors
    /// `CoreError::RowOutOfRange` when the edit names a row that does not
    /// exist. The record is consumed either way; clone first if the caller
    /// needs to keep it on failure.
    ///
    /// ## Example
    /// ```rust
    /// use goldloan_core::{ApplicationData, Edit};
    /// use goldloan_core::report::OrnamentField;
    ///
    /// let app = ApplicationData::new()
    ///     .apply(Edit::SetOrnament {
    ///         index: 0,
    ///         field: OrnamentField::GrossWeight,
    ///         value: "10".into(),
    ///     })
    ///     .unwrap();
    /// assert_eq!(app.ornaments[0].net_gold, "10.00");
    /// ```
    pub fn apply(self, edit: Edit) -> CoreResult<Self> {
        match edit {
            Edit::SetBorrower { field, value } => {
                let borrower = set_borrower_field(self.borrower.clone(), field, value);
                Ok(self.with_borrower(borrower))
            }

            Edit::SetOrnament {
                index,
                field,
                value,
            } => self.update_row(index, |row| set_ornament_field(row, field, value)),

            Edit::AddOrnament => {
                let mut ornaments = self.ornaments.clone();
                ornaments.push(OrnamentRow::new());
                Ok(self.with_ornaments(ornaments))
            }

            Edit::RemoveOrnament { index } => {
                let mut ornaments = self.ornaments.clone();
                check_index(index, ornaments.len())?;
                ornaments.remove(index);
                Ok(self.with_ornaments(ornaments))
            }

            Edit::AttachImages { index, names } => {
                self.update_row(index, |row| row.with_images(names))
            }

            Edit::SetOwnershipProof(value) => {
                let ownership = self.ownership.clone().with_proof(value);
                Ok(self.with_ownership(ownership))
            }

            Edit::SetOwnershipDocument(name) => {
                let ownership = self.ownership.clone().with_document(name);
                Ok(self.with_ownership(ownership))
            }

            Edit::SetOwnershipDeclaration(value) => {
                let ownership = self.ownership.clone().with_declaration(value);
                Ok(self.with_ownership(ownership))
            }

            Edit::SetGoldRate(value) => {
                let summary = self.loan_calculation_summary.clone().with_gold_rate(value);
                Ok(self.with_loan_calculation_summary(summary))
            }

            Edit::SetLtvRatio(value) => {
                let summary = self.loan_calculation_summary.clone().with_ltv_ratio(value);
                Ok(self.with_loan_calculation_summary(summary))
            }

            Edit::SetCompliance { field, value } => {
                let compliance = set_compliance_flag(self.regulatory_compliance, field, value);
                Ok(self.with_regulatory_compliance(compliance))
            }
        }
    }

    fn update_row<F>(self, index: usize, f: F) -> CoreResult<Self>
    where
        F: FnOnce(OrnamentRow) -> OrnamentRow,
    {
        check_index(index, self.ornaments.len())?;

        let mut ornaments = self.ornaments.clone();
        let row = std::mem::take(&mut ornaments[index]);
        ornaments[index] = f(row);
        Ok(self.with_ornaments(ornaments))
    }
}

fn check_index(index: usize, len: usize) -> CoreResult<()> {
    if index >= len {
        return Err(CoreError::RowOutOfRange { index, len });
    }
    Ok(())
}

fn set_borrower_field(borrower: Borrower, field: BorrowerField, value: String) -> Borrower {
    match field {
        BorrowerField::FullName => borrower.with_full_name(value),
        BorrowerField::Pan => borrower.with_pan(&value),
        BorrowerField::AadharNumber => borrower.with_aadhar_number(value),
        BorrowerField::Mobile => borrower.with_mobile(value),
        BorrowerField::Email => borrower.with_email(value),
        BorrowerField::AnnualIncome => borrower.with_annual_income(value),
    }
}

fn set_ornament_field(row: OrnamentRow, field: OrnamentField, value: String) -> OrnamentRow {
    match field {
        OrnamentField::GoldItems => row.with_gold_items(value),
        OrnamentField::GrossWeight => row.with_gross_weight(value),
        OrnamentField::StoneWeight => row.with_stone_weight(value),
        OrnamentField::Purity => row.with_purity(value),
        OrnamentField::MarketValue => row.with_market_value(value),
        OrnamentField::Hallmark => row.with_hallmark(value),
        OrnamentField::Description => row.with_description(value),
    }
}

fn set_compliance_flag(
    compliance: RegulatoryCompliance,
    field: ComplianceField,
    value: bool,
) -> RegulatoryCompliance {
    match field {
        ComplianceField::RbiCompliance => RegulatoryCompliance {
            rbi_compliance: value,
            ..compliance
        },
        ComplianceField::BorrowerPresent => RegulatoryCompliance {
            borrower_present: value,
            ..compliance
        },
        ComplianceField::MoneyLaunderingCheck => RegulatoryCompliance {
            money_laundering_check: value,
            ..compliance
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
