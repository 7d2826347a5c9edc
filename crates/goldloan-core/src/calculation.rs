//! # Loan Calculation
//!
//! Turns ornament weights and purity into an eligible loan amount.
//!
//! ## Derivation Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Per Row                                              │
//! │                                                                         │
//! │  GrossWeight ─┐                                                         │
//! │               ├─► NetGold = max(gross − stone, 0)          "8.00"      │
//! │  StoneWeight ─┘        │                                                │
//! │                        ▼                                                │
//! │  Purity ──────► EquivalentWeight = net × purity / 22       "8.0000"    │
//! │                                                                         │
//! │                    Across Rows                                          │
//! │                                                                         │
//! │  totalWeight  = Σ EquivalentWeight                                      │
//! │  totalValue   = Σ MarketValue × EquivalentWeight                        │
//! │  eligibleLoan = totalValue × ltv / 100          (ltv defaults to 75)    │
//! │  isWeightValid = 0 < totalWeight ≤ 500                                  │
//! │  coinsWeight  = Σ EquivalentWeight where goldItems == "coins"           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Sum the Rounded Strings?
//! The row's derived values are stored as the fixed-point strings the user
//! sees. Totals are summed from those strings, not from the unrounded
//! floats, so a record read back from storage reproduces the same totals
//! bit for bit.
//!
//! Nothing here is memoized. Recomputing the whole record is cheap and
//! gives identical results for identical inputs.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::numeric::{number_or_zero, parse_number, to_fixed};
use crate::types::OrnamentRow;
use crate::{COINS_CATEGORY, DEFAULT_LTV_RATIO, MAX_ELIGIBLE_WEIGHT, PURITY_BASIS_KARAT};

// =============================================================================
// Row Figures
// =============================================================================

/// Net weight of an item: gross minus stones, never below zero.
#[inline]
pub fn net_gold(gross: f64, stone: f64) -> f64 {
    (gross - stone).max(0.0)
}

/// Weight normalized to a 22 karat basis.
///
/// Returns zero for any non-positive or non-finite result.
///
/// ## Example
/// ```rust
/// use goldloan_core::calculation::equivalent_weight;
///
/// assert_eq!(equivalent_weight(8.0, 22.0), 8.0);
/// assert_eq!(equivalent_weight(11.0, 24.0), 12.0);
/// assert_eq!(equivalent_weight(8.0, -1.0), 0.0);
/// ```
#[inline]
pub fn equivalent_weight(net: f64, purity: f64) -> f64 {
    let eq = net * (purity / PURITY_BASIS_KARAT);
    if eq > 0.0 && eq.is_finite() {
        eq
    } else {
        0.0
    }
}

/// Derived figures for one ornament row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowFigures {
    pub net_gold: f64,
    pub equivalent_weight: f64,
}

impl RowFigures {
    /// Computes the figures from the row's raw inputs.
    pub fn of(row: &OrnamentRow) -> Self {
        let gross = number_or_zero(&row.gross_weight);
        let stone = number_or_zero(&row.stone_weight);
        let purity = number_or_zero(&row.purity);

        let net_gold = net_gold(gross, stone);
        RowFigures {
            net_gold,
            equivalent_weight: equivalent_weight(net_gold, purity),
        }
    }

    /// NetGold as displayed: two decimals.
    pub fn net_gold_text(&self) -> String {
        to_fixed(self.net_gold, 2)
    }

    /// EquivalentWeight as displayed: four decimals, or `"0"` when nothing
    /// counts.
    pub fn equivalent_weight_text(&self) -> String {
        if self.equivalent_weight > 0.0 {
            to_fixed(self.equivalent_weight, 4)
        } else {
            "0".to_string()
        }
    }
}

// =============================================================================
// Net Weight Totals
// =============================================================================

/// Returns true when the category names the coins bucket (any case).
#[inline]
pub fn is_coins(category: &str) -> bool {
    category.to_lowercase() == COINS_CATEGORY
}

/// Summed net weight, used by the weight ceilings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetWeightTotals {
    /// Net weight of every row.
    pub total: f64,
    /// Net weight of rows in the coins category.
    pub coins: f64,
}

/// Sums `max(gross − stone, 0)` over `rows`, straight from the raw inputs.
pub fn net_weight_totals(rows: &[OrnamentRow]) -> NetWeightTotals {
    rows.iter().fold(NetWeightTotals::default(), |mut acc, row| {
        let net = net_gold(
            number_or_zero(&row.gross_weight),
            number_or_zero(&row.stone_weight),
        );
        acc.total += net;
        if is_coins(&row.gold_items) {
            acc.coins += net;
        }
        acc
    })
}

// =============================================================================
// Calculation Section
// =============================================================================

/// Reads the loan-to-value percentage, falling back to 75 when the text is
/// blank, unreadable or zero.
pub fn ltv_ratio(value: &str) -> f64 {
    match parse_number(value) {
        Some(ltv) if ltv != 0.0 => ltv,
        _ => DEFAULT_LTV_RATIO,
    }
}

/// Zero for infinities and NaN.
#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Reads a stored total. JSON has no infinity, so an overflowed total may
/// have been written as `null`; it reads as zero and hydration recomputes it.
fn lenient_total<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?
        .map(finite_or_zero)
        .unwrap_or(0.0))
}

/// Loan figures derived from the whole ornament list.
///
/// Stored in the persisted document as `calculationsection`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculationSection {
    /// Σ 22 karat equivalent weight (g).
    #[serde(deserialize_with = "lenient_total")]
    pub total_weight: f64,
    /// Σ market value × equivalent weight.
    #[serde(deserialize_with = "lenient_total")]
    pub total_value: f64,
    /// Loan offered against the collateral.
    #[serde(deserialize_with = "lenient_total")]
    pub eligible_loan: f64,
    /// Σ equivalent weight of coins (g).
    #[serde(deserialize_with = "lenient_total")]
    pub coins_weight: f64,
    /// Whether the equivalent weight is inside (0, 500].
    pub is_weight_valid: bool,
}

impl Default for CalculationSection {
    fn default() -> Self {
        CalculationSection {
            total_weight: 0.0,
            total_value: 0.0,
            eligible_loan: 0.0,
            coins_weight: 0.0,
            is_weight_valid: true,
        }
    }
}

impl CalculationSection {
    /// Computes the section from the ornament rows and the LTV text.
    ///
    /// Rows are expected to carry up-to-date derived fields; see
    /// [`OrnamentRow::recalculated`].
    ///
    /// ## Example
    /// ```rust
    /// use goldloan_core::{CalculationSection, OrnamentRow};
    ///
    /// let row = OrnamentRow::new()
    ///     .with_gross_weight("10")
    ///     .with_stone_weight("2")
    ///     .with_purity("22")
    ///     .with_market_value("5000");
    ///
    /// let section = CalculationSection::compute(&[row], "75");
    /// assert_eq!(section.total_value, 40000.0);
    /// assert_eq!(section.eligible_loan, 30000.0);
    /// ```
    pub fn compute(rows: &[OrnamentRow], ltv: &str) -> Self {
        let mut total_weight = 0.0;
        let mut total_value = 0.0;
        let mut coins_weight = 0.0;

        for row in rows {
            let weight = number_or_zero(&row.equivalent_weight);
            let rate = number_or_zero(&row.market_value);

            total_weight += weight;
            total_value += rate * weight;
            if is_coins(&row.gold_items) {
                coins_weight += weight;
            }
        }

        let total_weight = finite_or_zero(total_weight);
        let total_value = finite_or_zero(total_value);

        CalculationSection {
            total_weight,
            total_value,
            eligible_loan: finite_or_zero(total_value * (ltv_ratio(ltv) / 100.0)),
            coins_weight: finite_or_zero(coins_weight),
            is_weight_valid: total_weight > 0.0 && total_weight <= MAX_ELIGIBLE_WEIGHT,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
