//! # Money Module
//!
//! Provides the `Money` type and the two scalar primitives every other
//! calculation is built from: [`apply_percent`] and [`round2`].
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    3 × 106.2 = 318.59999999999997   ❌ WRONG!                           │
//! │                                                                         │
//! │  Integer cents do not work either: quantities are fractional           │
//! │  (2.5 kg × 41.30/kg) and percentages carry decimals (12.5% GST).       │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal, full precision internally              │
//! │    3 × 106.2 = 318.6 exactly                                            │
//! │    round2() only when a value is shown or compared to stored totals    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use brokerbook_core::money::Money;
//! use brokerbook_core::types::Percent;
//!
//! let amount = Money::from_major(1000);
//! let discount = amount.apply_percent(Percent::from_major(10));
//! assert_eq!(discount, Money::from_major(100));
//! assert_eq!((amount - discount).to_string(), "900.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::{Percent, Quantity};

/// Number of decimal places used when presenting currency.
pub const CURRENCY_SCALE: u32 = 2;

// =============================================================================
// Scalar Primitives
// =============================================================================

/// Returns `base * percent / 100`.
///
/// The percent is NOT range-checked here. Callers validate rates at the
/// input boundary (see [`crate::validation::validate_percent`]).
#[inline]
pub fn apply_percent(base: Decimal, percent: Decimal) -> Decimal {
    base * percent / Decimal::ONE_HUNDRED
}

/// Rounds to 2 decimal places, half away from zero.
///
/// ```rust
/// use brokerbook_core::money::round2;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round2(Decimal::new(2345, 3)), Decimal::new(235, 2));   //  2.345 →  2.35
/// assert_eq!(round2(Decimal::new(-2345, 3)), Decimal::new(-235, 2)); // -2.345 → -2.35
/// ```
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the invoice currency.
///
/// ## Design Decisions
/// - **Decimal**: exact base-10 arithmetic, no float drift across line items
/// - **Signed**: intermediate differences (paid − due) may be negative before
///   they are floored with [`Money::floor_zero`]
/// - **Unrounded**: aggregation keeps full precision; round with
///   [`Money::round2`] at presentation boundaries only
///
/// ## Where Money Flows
/// ```text
/// ProductLine.rate ──► LineValuation.{amount, discount, gst, total}
///                              │
///                              ▼
///                      InvoiceTotals.net ──► Settlement.adjusted
///                              ▲                    ▲
/// ReturnLine × rate ───────────┘ (return value)     │
/// Payment.amount ───────────────────────────────────┘ (total paid)
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Zero money value.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps a decimal amount (major units, e.g. rupees).
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a whole-unit amount.
    ///
    /// ```rust
    /// use brokerbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(1062).to_string(), "1062.00");
    /// ```
    #[inline]
    pub fn from_major(major: i64) -> Self {
        Money(Decimal::from(major))
    }

    /// Creates an amount from minor units (paise / cents).
    ///
    /// ```rust
    /// use brokerbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(31860).to_string(), "318.60");
    /// ```
    #[inline]
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, CURRENCY_SCALE))
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money::ZERO
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is strictly less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns `max(0, self)`.
    ///
    /// Used for every "never negative" figure in settlement
    /// (adjusted invoice amount, pending, overpaid).
    #[inline]
    pub fn floor_zero(self) -> Self {
        self.max(Money::ZERO)
    }

    /// Rounds to 2 decimal places, half away from zero.
    #[inline]
    pub fn round2(&self) -> Self {
        Money(round2(self.0))
    }

    /// Applies a percentage: `self * percent / 100`.
    ///
    /// ## Example
    /// ```rust
    /// use brokerbook_core::money::Money;
    /// use brokerbook_core::types::Percent;
    ///
    /// let taxable = Money::from_major(900);
    /// let gst = taxable.apply_percent(Percent::from_major(18));
    /// assert_eq!(gst, Money::from_major(162));
    /// ```
    #[inline]
    pub fn apply_percent(&self, percent: Percent) -> Money {
        Money(apply_percent(self.0, percent.value()))
    }

    /// Multiplies a unit rate by a quantity.
    ///
    /// ```rust
    /// use brokerbook_core::money::Money;
    /// use brokerbook_core::types::Quantity;
    ///
    /// let rate = Money::from_major(100);
    /// assert_eq!(rate.times(Quantity::from_major(10)), Money::from_major(1000));
    /// ```
    #[inline]
    pub fn times(&self, quantity: Quantity) -> Money {
        Money(self.0 * quantity.value())
    }

    /// Returns true when `|self - other| <= tolerance`.
    #[inline]
    pub fn approx_eq(&self, other: Money, tolerance: Decimal) -> bool {
        (self.0 - other.0).abs() <= tolerance
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount rounded to 2 places, always with two fraction digits.
///
/// ## Note
/// No currency symbol: the dashboard formats with the tenant's locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = round2(self.0);
        if shown.is_zero() {
            // avoid "-0.00"
            shown = Decimal::ZERO;
        }
        shown.rescale(CURRENCY_SCALE);
        write!(f, "{}", shown)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
