//! # Invoice Aggregation
//!
//! Sums line valuations into invoice-level totals.
//!
//! ## Field Mapping
//! ```text
//! LineValuation.amount          ──Σ──▶  InvoiceTotals.gross_amount
//! LineValuation.discount_amount ──Σ──▶  InvoiceTotals.discount_amount
//! LineValuation.gst_amount      ──Σ──▶  InvoiceTotals.tax_amount
//! LineValuation.total           ──Σ──▶  InvoiceTotals.net_amount
//! ```
//!
//! ## Identity
//! `net = gross − discount + tax` holds for any set of lines because GST
//! is charged on the post-discount base. With exact decimals the gap is
//! zero; [`InvoiceTotals::satisfies_identity`] still takes a tolerance so
//! callers can compare against figures that went through rounding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ProductLine, Sale};
use crate::validation::validate_product_lines;
use crate::valuation::LineValuation;

/// Invoice-level totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceTotals {
    pub gross_amount: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub net_amount: Money,
}

/// One field where recomputed totals disagree with an expected figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TotalsDrift {
    pub field: String,
    pub expected: Money,
    pub computed: Money,
}

impl TotalsDrift {
    /// Signed difference `computed − expected`.
    pub fn difference(&self) -> Money {
        self.computed - self.expected
    }
}

impl From<TotalsDrift> for CoreError {
    fn from(drift: TotalsDrift) -> Self {
        CoreError::TotalsMismatch {
            field: drift.field,
            expected: drift.expected,
            computed: drift.computed,
        }
    }
}

impl InvoiceTotals {
    pub const ZERO: InvoiceTotals = InvoiceTotals {
        gross_amount: Money::ZERO,
        discount_amount: Money::ZERO,
        tax_amount: Money::ZERO,
        net_amount: Money::ZERO,
    };

    /// Folds one line valuation into the running totals.
    pub fn accumulate(&mut self, valuation: &LineValuation) {
        self.gross_amount += valuation.amount;
        self.discount_amount += valuation.discount_amount;
        self.tax_amount += valuation.gst_amount;
        self.net_amount += valuation.total;
    }

    /// `net − (gross − discount + tax)`. Zero for totals built by [`aggregate`].
    pub fn identity_gap(&self) -> Money {
        self.net_amount - (self.gross_amount - self.discount_amount + self.tax_amount)
    }

    /// True when `|identity_gap| ≤ tolerance`.
    pub fn satisfies_identity(&self, tolerance: Decimal) -> bool {
        self.identity_gap().abs().amount() <= tolerance
    }

    /// Every figure rounded to 2 places for display.
    pub fn rounded(&self) -> Self {
        InvoiceTotals {
            gross_amount: self.gross_amount.round2(),
            discount_amount: self.discount_amount.round2(),
            tax_amount: self.tax_amount.round2(),
            net_amount: self.net_amount.round2(),
        }
    }

    fn fields(&self) -> [(&'static str, Money); 4] {
        [
            ("grossAmount", self.gross_amount),
            ("discountAmount", self.discount_amount),
            ("taxAmount", self.tax_amount),
            ("netAmount", self.net_amount),
        ]
    }

    /// Fields that differ from `expected` by more than `tolerance`,
    /// in gross → discount → tax → net order.
    pub fn drift(&self, expected: &InvoiceTotals, tolerance: Decimal) -> Vec<TotalsDrift> {
        self.fields()
            .into_iter()
            .zip(expected.fields())
            .filter(|((_, computed), (_, expected))| !computed.approx_eq(*expected, tolerance))
            .map(|((field, computed), (_, expected))| TotalsDrift {
                field: field.to_string(),
                expected,
                computed,
            })
            .collect()
    }

    /// True when every field is within `tolerance` of `expected`.
    pub fn matches(&self, expected: &InvoiceTotals, tolerance: Decimal) -> bool {
        self.drift(expected, tolerance).is_empty()
    }

    /// Like [`matches`](Self::matches) but reports the first differing
    /// field as [`CoreError::TotalsMismatch`].
    pub fn verify_against(&self, expected: &InvoiceTotals, tolerance: Decimal) -> CoreResult<()> {
        match self.drift(expected, tolerance).into_iter().next() {
            Some(drift) => Err(drift.into()),
            None => Ok(()),
        }
    }
}

/// Sums the valuations of `lines`. An empty slice yields all zeros.
///
/// ## Example
/// ```rust
/// use brokerbook_core::invoice::aggregate;
/// use brokerbook_core::money::Money;
/// use brokerbook_core::types::{Percent, ProductLine, Quantity};
///
/// let line = ProductLine::new("Rice", Quantity::from_major(10), Money::from_major(100))
///     .with_discount(Percent::from_major(10))
///     .with_gst(Percent::from_major(18));
///
/// let totals = aggregate(&[line.clone(), line]);
/// assert_eq!(totals.gross_amount, Money::from_major(2000));
/// assert_eq!(totals.net_amount, Money::from_major(2124));
/// ```
pub fn aggregate(lines: &[ProductLine]) -> InvoiceTotals {
    aggregate_valuations(lines.iter().map(ProductLine::valuation))
}

/// Validates every line, then aggregates.
pub fn aggregate_checked(lines: &[ProductLine]) -> CoreResult<InvoiceTotals> {
    validate_product_lines(lines)?;
    Ok(aggregate(lines))
}

/// Sums already-computed valuations (e.g. pending valuations after returns).
pub fn aggregate_valuations<I>(valuations: I) -> InvoiceTotals
where
    I: IntoIterator<Item = LineValuation>,
{
    let mut totals = InvoiceTotals::ZERO;
    for valuation in valuations {
        totals.accumulate(&valuation);
    }
    totals
}

impl Sale {
    /// Totals recorded by the backend, if all four are present.
    pub fn stored_totals(&self) -> Option<InvoiceTotals> {
        Some(InvoiceTotals {
            gross_amount: self.invoice_gross_amount?,
            discount_amount: self.invoice_discount_amount?,
            tax_amount: self.invoice_tax_amount?,
            net_amount: self.invoice_net_amount?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Percent, Quantity};
    use crate::{IDENTITY_TOLERANCE, MONEY_TOLERANCE};
    use rust_decimal_macros::dec;

    fn rice() -> ProductLine {
        ProductLine::new("Basmati Rice", Quantity::from_major(10), Money::from_major(100))
            .with_discount(Percent::from_major(10))
            .with_gst(Percent::from_major(18))
    }

    #[test]
    fn test_two_identical_lines() {
        let totals = aggregate(&[rice(), rice()]);
        assert_eq!(totals.gross_amount, Money::from_major(2000));
        assert_eq!(totals.discount_amount, Money::from_major(200));
        assert_eq!(totals.tax_amount, Money::from_major(324));
        assert_eq!(totals.net_amount, Money::from_major(2124));
        assert!(totals.satisfies_identity(IDENTITY_TOLERANCE));
        assert!(totals.identity_gap().is_zero());
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(aggregate(&[]), InvoiceTotals::ZERO);
        assert!(aggregate_checked(&[]).is_ok());
    }

    #[test]
    fn test_mixed_rates_keep_identity() {
        let lines = vec![
            rice(),
            ProductLine::new("Ghee", Quantity::new(dec!(3.5)), Money::new(dec!(612.40)))
                .with_gst(Percent::from_major(12)),
            ProductLine::new("Salt", Quantity::from_major(40), Money::new(dec!(18.75)))
                .with_discount(Percent::new(dec!(7.5))),
        ];
        let totals = aggregate(&lines);
        assert!(totals.satisfies_identity(IDENTITY_TOLERANCE));
    }

    #[test]
    fn test_aggregate_checked_rejects() {
        let bad = rice().with_discount(Percent::from_major(-5));
        assert!(aggregate_checked(&[rice(), bad]).is_err());
    }

    #[test]
    fn test_verify_against() {
        let computed = aggregate(&[rice(), rice()]);

        let mut stored = computed;
        stored.net_amount = Money::new(dec!(2124.004));
        assert!(computed.matches(&stored, MONEY_TOLERANCE));
        assert!(computed.verify_against(&stored, MONEY_TOLERANCE).is_ok());

        stored.tax_amount = Money::from_major(360);
        stored.net_amount = Money::from_major(2160);
        let drift = computed.drift(&stored, MONEY_TOLERANCE);
        assert_eq!(drift.len(), 2);
        assert_eq!(drift[0].field, "taxAmount");
        assert_eq!(drift[0].difference(), Money::from_major(-36));

        match computed.verify_against(&stored, MONEY_TOLERANCE) {
            Err(CoreError::TotalsMismatch { field, expected, computed }) => {
                assert_eq!(field, "taxAmount");
                assert_eq!(expected, Money::from_major(360));
                assert_eq!(computed, Money::from_major(324));
            }
            other => panic!("expected TotalsMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_rounded() {
        let line = ProductLine::new("Oil", Quantity::from_major(1), Money::new(dec!(99.99)))
            .with_gst(Percent::from_major(5));
        let totals = aggregate(&[line]).rounded();
        assert_eq!(totals.tax_amount, Money::from_minor(500));
        assert_eq!(totals.net_amount, Money::new(dec!(104.99)));
    }
}
