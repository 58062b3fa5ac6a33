//! # Money Module
//!
//! Sale pricing arithmetic, profit/loss classification and display formatting.
//!
//! ## Precision Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ONE FORMULA, FULL PRECISION                                            │
//! │                                                                         │
//! │    total_sale      = quantity_sold × unit_price                         │
//! │    discount_amount = total_sale × discount_percent / 100                │
//! │    final_total     = total_sale − discount_amount                       │
//! │                                                                         │
//! │  • No intermediate rounding: every field is derived from the unrounded │
//! │    values above and stored as-is (f64).                                 │
//! │  • Rounding happens only when a value is shown (`format_amount`).       │
//! │  • Every read path (receipt, summary, profit/loss, customers) reads    │
//! │    the stored field it needs; nothing re-derives a total on its own.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DISPLAY_DECIMALS;

/// Tolerance used when comparing two monetary values computed in f64.
pub const MONEY_TOLERANCE: f64 = 1e-6;

// =============================================================================
// Sale Totals
// =============================================================================

/// The three derived monetary fields of a sale.
///
/// ## Invariants
/// - `discount_amount = total_sale * discount_percent / 100`
/// - `final_total = total_sale - discount_amount`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub total_sale: f64,
    pub discount_amount: f64,
    pub final_total: f64,
}

impl SaleTotals {
    /// Computes totals for `quantity` units at `unit_price` with a percentage discount.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::SaleTotals;
    ///
    /// let totals = SaleTotals::compute(2, 19.99, 0.0);
    /// assert_eq!(totals.discount_amount, 0.0);
    /// assert_eq!(totals.final_total, totals.total_sale);
    /// ```
    pub fn compute(quantity: i64, unit_price: f64, discount_percent: f64) -> Self {
        let total_sale = quantity as f64 * unit_price;
        let discount_amount = total_sale * discount_percent / 100.0;
        SaleTotals {
            total_sale,
            discount_amount,
            final_total: total_sale - discount_amount,
        }
    }

    /// Checks both formula invariants against a given discount percent.
    pub fn is_consistent(&self, discount_percent: f64) -> bool {
        approx_eq(
            self.discount_amount,
            self.total_sale * discount_percent / 100.0,
        ) && approx_eq(self.final_total, self.total_sale - self.discount_amount)
    }
}

// =============================================================================
// Profit / Loss
// =============================================================================

/// Profit or loss of a single sale against its cost.
///
/// At most one of the two fields is non-zero; both are zero when the sale
/// exactly covered its cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitOutcome {
    pub profit: f64,
    pub loss: f64,
}

impl ProfitOutcome {
    /// Classifies `final_total` against `cost_total`.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::ProfitOutcome;
    ///
    /// let outcome = ProfitOutcome::assess(540.0, 360.0);
    /// assert_eq!(outcome.profit, 180.0);
    /// assert_eq!(outcome.loss, 0.0);
    /// ```
    pub fn assess(final_total: f64, cost_total: f64) -> Self {
        if final_total > cost_total {
            ProfitOutcome {
                profit: final_total - cost_total,
                loss: 0.0,
            }
        } else if final_total < cost_total {
            ProfitOutcome {
                profit: 0.0,
                loss: cost_total - final_total,
            }
        } else {
            ProfitOutcome::default()
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Compares two monetary values within [`MONEY_TOLERANCE`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= MONEY_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Collapses a possibly-missing stored amount into a usable number.
///
/// Missing values and non-finite values (NaN, ±inf) count as zero so that a
/// single damaged legacy row cannot poison an aggregate.
#[inline]
pub fn or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Formats an amount at display precision.
///
/// ## Example
/// ```rust
/// use stockbook_core::money::format_amount;
///
/// assert_eq!(format_amount(540.0), "540.00");
/// assert_eq!(format_amount(0.1 + 0.2), "0.30");
/// ```
pub fn format_amount(value: f64) -> String {
    format!("{:.*}", DISPLAY_DECIMALS, value)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_shirt_totals() {
        let totals = SaleTotals::compute(3, 200.0, 10.0);
        assert_eq!(totals.total_sale, 600.0);
        assert_eq!(totals.discount_amount, 60.0);
        assert_eq!(totals.final_total, 540.0);
        assert!(totals.is_consistent(10.0));
    }

    #[test]
    fn test_totals_hold_invariants_for_awkward_values() {
        for &(qty, price, pct) in &[
            (1, 0.1, 33.3),
            (7, 19.99, 12.5),
            (13, 0.07, 100.0),
            (250, 3.3333, 0.0),
            (1, 0.0, 50.0),
        ] {
            let totals = SaleTotals::compute(qty, price, pct);
            assert!(totals.is_consistent(pct), "{qty} x {price} @ {pct}%");
        }
    }

    #[test]
    fn test_full_discount_is_free() {
        let totals = SaleTotals::compute(4, 25.0, 100.0);
        assert_eq!(totals.discount_amount, 100.0);
        assert_eq!(totals.final_total, 0.0);
    }

    #[test]
    fn test_profit_outcome() {
        assert_eq!(
            ProfitOutcome::assess(540.0, 360.0),
            ProfitOutcome {
                profit: 180.0,
                loss: 0.0
            }
        );
        assert_eq!(
            ProfitOutcome::assess(100.0, 150.0),
            ProfitOutcome {
                profit: 0.0,
                loss: 50.0
            }
        );
        assert_eq!(ProfitOutcome::assess(75.0, 75.0), ProfitOutcome::default());
    }

    #[test]
    fn test_or_zero() {
        assert_eq!(or_zero(None), 0.0);
        assert_eq!(or_zero(Some(f64::NAN)), 0.0);
        assert_eq!(or_zero(Some(f64::INFINITY)), 0.0);
        assert_eq!(or_zero(Some(12.5)), 12.5);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(7.0 / 3.0), "2.33");
        assert_eq!(format_amount(-3.5), "-3.50");
        assert_eq!(format_amount(0.0), "0.00");
    }
}
