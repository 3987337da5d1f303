//! # Payment Settlement
//!
//! Balances what the buyer owes after returns against what they paid, and
//! what the broker is owed in commission against what was paid to them.
//!
//! ```text
//! adjusted = max(0, invoiceNet − totalReturnValue)
//! paid     = Σ payment.amount
//! pending  = max(0, adjusted − paid)
//! overpaid = max(0, paid − adjusted)
//! ```
//!
//! At most one of `pending` / `overpaid` is ever positive. An overpaid
//! balance is a legitimate state and is reported, never clamped away.
//!
//! The sale `status` string is not derived here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{Commission, Payment, Percent};
use crate::validation::{validate_amount, validate_payments, validate_percent};

/// Where a balance stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum BalanceState {
    Outstanding,
    Settled,
    Overpaid,
}

/// `(pending, overpaid)` for an amount due and an amount paid.
fn split_balance(due: Money, paid: Money) -> (Money, Money) {
    ((due - paid).floor_zero(), (paid - due).floor_zero())
}

fn balance_state(pending: Money, overpaid: Money) -> BalanceState {
    if pending.is_positive() {
        BalanceState::Outstanding
    } else if overpaid.is_positive() {
        BalanceState::Overpaid
    } else {
        BalanceState::Settled
    }
}

// =============================================================================
// Buyer Settlement
// =============================================================================

/// Buyer-side balance of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Settlement {
    pub adjusted_invoice_amount: Money,
    pub total_paid: Money,
    pub pending_amount: Money,
    pub overpaid_amount: Money,
}

impl Settlement {
    /// Settles `payments` against `invoice_net` less `total_return_value`.
    ///
    /// ## Example
    /// ```rust
    /// use brokerbook_core::money::Money;
    /// use brokerbook_core::settlement::Settlement;
    /// use brokerbook_core::types::{Payment, PaymentMethod};
    /// use rust_decimal_macros::dec;
    ///
    /// let payments = vec![
    ///     Payment::new(Money::from_major(1000), PaymentMethod::Cash),
    ///     Payment::new(Money::from_major(500), PaymentMethod::Cheque),
    /// ];
    /// let s = Settlement::compute(Money::from_major(2124), Money::new(dec!(318.6)), &payments);
    /// assert_eq!(s.adjusted_invoice_amount, Money::new(dec!(1805.4)));
    /// assert_eq!(s.pending_amount, Money::new(dec!(305.4)));
    /// assert!(s.overpaid_amount.is_zero());
    /// ```
    pub fn compute(invoice_net: Money, total_return_value: Money, payments: &[Payment]) -> Self {
        let total_paid = payments.iter().map(|p| p.amount).sum();
        Self::from_amounts(invoice_net, total_return_value, total_paid)
    }

    /// Same as [`compute`](Self::compute) with the paid total already summed.
    pub fn from_amounts(invoice_net: Money, total_return_value: Money, total_paid: Money) -> Self {
        let adjusted_invoice_amount = (invoice_net - total_return_value).floor_zero();
        let (pending_amount, overpaid_amount) = split_balance(adjusted_invoice_amount, total_paid);

        Settlement {
            adjusted_invoice_amount,
            total_paid,
            pending_amount,
            overpaid_amount,
        }
    }

    /// Validates the amounts, then computes.
    pub fn compute_checked(
        invoice_net: Money,
        total_return_value: Money,
        payments: &[Payment],
    ) -> CoreResult<Self> {
        validate_amount("invoiceNetAmount", invoice_net)?;
        validate_amount("totalReturnValue", total_return_value)?;
        validate_payments("payments", payments)?;
        Ok(Self::compute(invoice_net, total_return_value, payments))
    }

    pub fn balance_state(&self) -> BalanceState {
        balance_state(self.pending_amount, self.overpaid_amount)
    }

    pub fn rounded(&self) -> Self {
        Settlement {
            adjusted_invoice_amount: self.adjusted_invoice_amount.round2(),
            total_paid: self.total_paid.round2(),
            pending_amount: self.pending_amount.round2(),
            overpaid_amount: self.overpaid_amount.round2(),
        }
    }
}

/// Shorthand for [`Settlement::compute`].
pub fn settle_payments(invoice_net: Money, total_return_value: Money, payments: &[Payment]) -> Settlement {
    Settlement::compute(invoice_net, total_return_value, payments)
}

// =============================================================================
// Commission Settlement
// =============================================================================

/// Broker-side balance: commission due on a base amount versus commission
/// already paid. Independent of the buyer's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommissionSettlement {
    pub base: Money,
    pub commission_rate: Percent,
    pub commission_due: Money,
    pub total_paid: Money,
    pub pending_amount: Money,
    pub overpaid_amount: Money,
}

impl CommissionSettlement {
    pub fn balance_state(&self) -> BalanceState {
        balance_state(self.pending_amount, self.overpaid_amount)
    }
}

/// `commission_due = base × rate / 100`, settled against `commissions`.
pub fn settle_commission(
    base: Money,
    commission_rate: Percent,
    commissions: &[Commission],
) -> CommissionSettlement {
    let commission_due = base.apply_percent(commission_rate);
    let total_paid = commissions.iter().map(|c| c.amount).sum();
    let (pending_amount, overpaid_amount) = split_balance(commission_due, total_paid);

    CommissionSettlement {
        base,
        commission_rate,
        commission_due,
        total_paid,
        pending_amount,
        overpaid_amount,
    }
}

/// Validates the rate and amounts, then settles.
pub fn settle_commission_checked(
    base: Money,
    commission_rate: Percent,
    commissions: &[Commission],
) -> CoreResult<CommissionSettlement> {
    validate_amount("commissionBase", base)?;
    validate_percent("commissionRate", commission_rate)?;
    validate_payments("commissions", commissions)?;
    Ok(settle_commission(base, commission_rate, commissions))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::types::PaymentMethod;
    use rust_decimal_macros::dec;

    fn pay(amount: i64) -> Payment {
        Payment::new(Money::from_major(amount), PaymentMethod::BankTransfer)
    }

    #[test]
    fn test_partial_payment() {
        let s = Settlement::compute(
            Money::from_major(2124),
            Money::new(dec!(318.6)),
            &[pay(1000), pay(500)],
        );
        assert_eq!(s.adjusted_invoice_amount, Money::new(dec!(1805.4)));
        assert_eq!(s.total_paid, Money::from_major(1500));
        assert_eq!(s.pending_amount, Money::new(dec!(305.4)));
        assert_eq!(s.overpaid_amount, Money::ZERO);
        assert_eq!(s.balance_state(), BalanceState::Outstanding);
    }

    #[test]
    fn test_overpayment_is_reported() {
        let s = Settlement::compute(Money::from_major(2124), Money::new(dec!(318.6)), &[pay(2000)]);
        assert_eq!(s.pending_amount, Money::ZERO);
        assert_eq!(s.overpaid_amount, Money::new(dec!(194.6)));
        assert_eq!(s.balance_state(), BalanceState::Overpaid);
    }

    #[test]
    fn test_exact_payment_settles() {
        let s = Settlement::compute(Money::from_major(500), Money::ZERO, &[pay(200), pay(300)]);
        assert!(s.pending_amount.is_zero());
        assert!(s.overpaid_amount.is_zero());
        assert_eq!(s.balance_state(), BalanceState::Settled);
    }

    #[test]
    fn test_no_payments() {
        let s = settle_payments(Money::from_major(800), Money::ZERO, &[]);
        assert_eq!(s.total_paid, Money::ZERO);
        assert_eq!(s.pending_amount, Money::from_major(800));
    }

    #[test]
    fn test_returns_exceeding_invoice_floor_at_zero() {
        let s = Settlement::compute(Money::from_major(100), Money::from_major(150), &[pay(20)]);
        assert_eq!(s.adjusted_invoice_amount, Money::ZERO);
        assert_eq!(s.overpaid_amount, Money::from_major(20));
    }

    #[test]
    fn test_compute_checked() {
        let err = Settlement::compute_checked(Money::from_major(100), Money::ZERO, &[pay(-5)]).unwrap_err();
        match err {
            CoreError::Validation(ValidationError::NegativeAmount { field, .. }) => {
                assert_eq!(field, "payments[0].amount");
            }
            other => panic!("expected NegativeAmount, got {other:?}"),
        }
    }

    #[test]
    fn test_commission() {
        let c = settle_commission(
            Money::new(dec!(1805.4)),
            Percent::from_major(2),
            &[pay(20)],
        );
        assert_eq!(c.commission_due, Money::new(dec!(36.108)));
        assert_eq!(c.pending_amount, Money::new(dec!(16.108)));
        assert_eq!(c.pending_amount.round2(), Money::new(dec!(16.11)));
        assert_eq!(c.balance_state(), BalanceState::Outstanding);

        let c = settle_commission(Money::from_major(1000), Percent::from_major(2), &[pay(25)]);
        assert_eq!(c.overpaid_amount, Money::from_major(5));
    }

    #[test]
    fn test_commission_checked_rejects_rate() {
        assert!(settle_commission_checked(Money::from_major(100), Percent::from_major(101), &[]).is_err());
        assert!(settle_commission_checked(Money::from_major(100), Percent::ZERO, &[]).is_ok());
    }
}
