//! # Line-Item Valuation
//!
//! Turns one product line into its five money figures.
//!
//! ```text
//! amount          = quantity × rate
//! discountAmount  = amount × discountRate / 100
//! taxableAmount   = amount − discountAmount
//! gstAmount       = taxableAmount × gstRate / 100     ← post-discount base
//! total           = taxableAmount + gstAmount
//! ```
//!
//! The valuation is linear in quantity, so the same function values sold
//! lines, returned lines and pending (still-held) lines.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{Percent, ProductLine, Quantity};
use crate::validation::validate_product_line;

/// The computed money figures for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineValuation {
    pub amount: Money,
    pub discount_amount: Money,
    pub taxable_amount: Money,
    pub gst_amount: Money,
    pub total: Money,
}

impl LineValuation {
    /// All-zero valuation (a zero-quantity line).
    pub const ZERO: LineValuation = LineValuation {
        amount: Money::ZERO,
        discount_amount: Money::ZERO,
        taxable_amount: Money::ZERO,
        gst_amount: Money::ZERO,
        total: Money::ZERO,
    };

    /// Every figure rounded to 2 places for display.
    pub fn rounded(&self) -> Self {
        LineValuation {
            amount: self.amount.round2(),
            discount_amount: self.discount_amount.round2(),
            taxable_amount: self.taxable_amount.round2(),
            gst_amount: self.gst_amount.round2(),
            total: self.total.round2(),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == LineValuation::ZERO
    }
}

impl Add for LineValuation {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        LineValuation {
            amount: self.amount + other.amount,
            discount_amount: self.discount_amount + other.discount_amount,
            taxable_amount: self.taxable_amount + other.taxable_amount,
            gst_amount: self.gst_amount + other.gst_amount,
            total: self.total + other.total,
        }
    }
}

impl AddAssign for LineValuation {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for LineValuation {
    fn sum<I: Iterator<Item = LineValuation>>(iter: I) -> Self {
        iter.fold(LineValuation::ZERO, Add::add)
    }
}

/// Values `quantity` units at `rate` with the given discount and GST.
///
/// Pure and unchecked: rates outside [0, 100] flow through as-is.
/// Use [`ProductLine::valuation_checked`] at input boundaries.
///
/// ## Example
/// ```rust
/// use brokerbook_core::money::Money;
/// use brokerbook_core::types::{Percent, Quantity};
/// use brokerbook_core::valuation::value_line;
///
/// let v = value_line(
///     Quantity::from_major(10),
///     Money::from_major(100),
///     Percent::from_major(10),
///     Percent::from_major(18),
/// );
/// assert_eq!(v.amount, Money::from_major(1000));
/// assert_eq!(v.discount_amount, Money::from_major(100));
/// assert_eq!(v.taxable_amount, Money::from_major(900));
/// assert_eq!(v.gst_amount, Money::from_major(162));
/// assert_eq!(v.total, Money::from_major(1062));
/// ```
pub fn value_line(
    quantity: Quantity,
    rate: Money,
    discount_rate: Percent,
    gst_rate: Percent,
) -> LineValuation {
    let amount = rate.times(quantity);
    let discount_amount = amount.apply_percent(discount_rate);
    let taxable_amount = amount - discount_amount;
    let gst_amount = taxable_amount.apply_percent(gst_rate);

    LineValuation {
        amount,
        discount_amount,
        taxable_amount,
        gst_amount,
        total: taxable_amount + gst_amount,
    }
}

impl ProductLine {
    /// Valuation at the stored quantity.
    pub fn valuation(&self) -> LineValuation {
        self.valuation_at(self.quantity)
    }

    /// Valuation of `quantity` units at this line's rate, discount and GST.
    pub fn valuation_at(&self, quantity: Quantity) -> LineValuation {
        value_line(quantity, self.rate, self.discount_rate, self.gst_rate)
    }

    /// Total for a single unit, discount and GST included.
    pub fn unit_total(&self) -> Money {
        self.valuation_at(Quantity::from_major(1)).total
    }

    /// Validates the line, then values it.
    pub fn valuation_checked(&self) -> CoreResult<LineValuation> {
        validate_product_line("product", self)?;
        Ok(self.valuation())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use rust_decimal_macros::dec;

    fn rice() -> ProductLine {
        ProductLine::new("Basmati Rice", Quantity::from_major(10), Money::from_major(100))
            .with_discount(Percent::from_major(10))
            .with_gst(Percent::from_major(18))
    }

    #[test]
    fn test_reference_line() {
        let v = rice().valuation();
        assert_eq!(v.amount, Money::from_major(1000));
        assert_eq!(v.discount_amount, Money::from_major(100));
        assert_eq!(v.taxable_amount, Money::from_major(900));
        assert_eq!(v.gst_amount, Money::from_major(162));
        assert_eq!(v.total, Money::from_major(1062));
    }

    #[test]
    fn test_gst_uses_post_discount_base() {
        // 18% of the gross 1000 would be 180
        let v = rice().valuation();
        assert_ne!(v.gst_amount, Money::from_major(180));
        assert_eq!(v.gst_amount, Money::from_major(162));
    }

    #[test]
    fn test_zero_quantity_is_all_zero() {
        let v = rice().valuation_at(Quantity::ZERO);
        assert!(v.is_zero());
    }

    #[test]
    fn test_unit_total() {
        assert_eq!(rice().unit_total(), Money::new(dec!(106.2)));
    }

    #[test]
    fn test_fractional_quantity() {
        let sugar = ProductLine::new("Sugar", Quantity::new(dec!(2.5)), Money::new(dec!(41.30)))
            .with_gst(Percent::from_major(5));
        let v = sugar.valuation();
        assert_eq!(v.amount, Money::new(dec!(103.25)));
        assert_eq!(v.gst_amount, Money::new(dec!(5.1625)));
        assert_eq!(v.total, Money::new(dec!(108.4125)));
        assert_eq!(v.rounded().total, Money::new(dec!(108.41)));
    }

    #[test]
    fn test_linear_in_quantity() {
        let line = rice();
        let three = line.valuation_at(Quantity::from_major(3));
        let seven = line.valuation_at(Quantity::from_major(7));
        assert_eq!(three + seven, line.valuation());
    }

    #[test]
    fn test_sum() {
        let line = rice();
        let total: LineValuation = vec![line.valuation(), line.valuation()].into_iter().sum();
        assert_eq!(total.total, Money::from_major(2124));
    }

    #[test]
    fn test_valuation_checked_rejects_bad_rates() {
        let bad = rice().with_gst(Percent::from_major(118));
        let err = bad.valuation_checked().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidRate { .. })
        ));

        // the unchecked path does not clamp
        assert_eq!(bad.valuation().gst_amount, Money::from_major(1062));
    }
}
