//! # Sale Statement
//!
//! One call that produces every figure a sale detail view, invoice table
//! or reminder job needs, so none of them re-implements the math.
//!
//! ```text
//! Sale ──validate──▶ reconcile_returns ──▶ original / pending totals
//!                          │                        │
//!                          ▼                        ▼
//!                 total_return_value      compare with stored totals
//!                          │
//!                          ▼
//!         Settlement (net − returns vs payments)
//!                          │
//!                          ▼
//!         CommissionSettlement (rate × adjusted amount vs commissions)
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::CoreResult;
use crate::invoice::{InvoiceTotals, TotalsDrift};
use crate::returns::{reconcile_returns, ReconcileOptions, ReconcileWarning, ReturnsReconciliation};
use crate::settlement::{settle_commission_checked, BalanceState, CommissionSettlement, Settlement};
use crate::types::{Commission, GoodsReturnBatch, Payment, Sale, SaleStatus};
use crate::validation::validate_sale;
use crate::MONEY_TOLERANCE;

/// Non-fatal findings on a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind")]
#[ts(export)]
pub enum StatementWarning {
    /// A stored backend total differs from the recomputed original total.
    #[serde(rename_all = "camelCase")]
    StoredTotalsMismatch { drift: TotalsDrift },

    /// Raised while reconciling returns.
    #[serde(rename_all = "camelCase")]
    Returns { warning: ReconcileWarning },
}

impl fmt::Display for StatementWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementWarning::StoredTotalsMismatch { drift } => write!(
                f,
                "stored {} is {}, recomputed {}",
                drift.field, drift.expected, drift.computed
            ),
            StatementWarning::Returns { warning } => write!(f, "{warning}"),
        }
    }
}

/// Every computed figure for one sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleStatement {
    pub sale_id: String,
    pub invoice_number: String,
    /// Carried through from the backend untouched.
    pub status: SaleStatus,
    #[ts(as = "String")]
    pub invoice_date: NaiveDate,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    /// Lines as originally sold (returns added back).
    pub original_totals: InvoiceTotals,
    /// Lines as still held by the buyer.
    pub pending_totals: InvoiceTotals,
    /// Totals the backend recorded, when it supplied all four.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_totals: Option<InvoiceTotals>,
    pub returns: ReturnsReconciliation,
    pub settlement: Settlement,
    pub commission: CommissionSettlement,
    pub warnings: Vec<StatementWarning>,
}

impl SaleStatement {
    /// Days since the due date. Negative while not yet due.
    pub fn days_past_due(&self, today: NaiveDate) -> i64 {
        (today - self.due_date).num_days()
    }

    /// True when the due date has passed and money is still owed.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        today > self.due_date && self.settlement.pending_amount.is_positive()
    }

    pub fn balance_state(&self) -> BalanceState {
        self.settlement.balance_state()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Builds the full statement for `sale`.
///
/// The invoice net used for settlement is the stored `invoiceNetAmount`
/// when present, otherwise the net of the reconstructed original lines.
/// Commission is charged on the adjusted (post-return) invoice amount.
///
/// ## Errors
/// Any validation failure on the sale, its returns, payments or
/// commissions, and unmatched return lines.
pub fn build_statement(
    sale: &Sale,
    batches: &[GoodsReturnBatch],
    payments: &[Payment],
    commissions: &[Commission],
    options: &ReconcileOptions,
) -> CoreResult<SaleStatement> {
    validate_sale(sale)?;

    let returns = reconcile_returns(&sale.products, batches, options)?;
    let original_totals = returns.original_totals();
    let pending_totals = returns.pending_totals();
    let stored_totals = sale.stored_totals();

    let mut warnings: Vec<StatementWarning> = Vec::new();
    if let Some(stored) = &stored_totals {
        warnings.extend(
            original_totals
                .drift(stored, MONEY_TOLERANCE)
                .into_iter()
                .map(|drift| StatementWarning::StoredTotalsMismatch { drift }),
        );
    }
    warnings.extend(
        returns
            .warnings
            .iter()
            .cloned()
            .map(|warning| StatementWarning::Returns { warning }),
    );

    let invoice_net = sale
        .invoice_net_amount
        .unwrap_or(original_totals.net_amount);
    let settlement = Settlement::compute_checked(invoice_net, returns.total_return_value, payments)?;
    let commission = settle_commission_checked(
        settlement.adjusted_invoice_amount,
        sale.commission_rate,
        commissions,
    )?;

    Ok(SaleStatement {
        sale_id: sale.id.clone(),
        invoice_number: sale.invoice_number.clone(),
        status: sale.status,
        invoice_date: sale.invoice_date,
        due_date: sale.due_date(),
        original_totals,
        pending_totals,
        stored_totals,
        returns,
        settlement,
        commission,
        warnings,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::returns::QuantityBasis;
    use crate::types::{PaymentMethod, Percent, ProductLine, Quantity, ReturnLine};
    use crate::error::{CoreError, ValidationError};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rice(quantity: i64) -> ProductLine {
        ProductLine::new("Basmati Rice", Quantity::from_major(quantity), Money::from_major(100))
            .with_id("p-rice")
            .with_discount(Percent::from_major(10))
            .with_gst(Percent::from_major(18))
    }

    /// Two reference lines; three units of the first have since come back.
    fn sale() -> Sale {
        Sale {
            id: "sale-1".to_string(),
            invoice_number: "INV-2024-001".to_string(),
            invoice_date: date(2024, 3, 1),
            due_days: 30,
            commission_rate: Percent::from_major(2),
            status: SaleStatus::PartiallyPaid,
            seller_id: "seller-1".to_string(),
            buyer_id: "buyer-1".to_string(),
            products: vec![
                rice(7),
                rice(10).with_id("p-rice-2").with_unit("kg"),
            ],
            invoice_gross_amount: Some(Money::from_major(2000)),
            invoice_discount_amount: Some(Money::from_major(200)),
            invoice_tax_amount: Some(Money::from_major(324)),
            invoice_net_amount: Some(Money::from_major(2124)),
        }
    }

    fn returns() -> Vec<GoodsReturnBatch> {
        vec![GoodsReturnBatch::new(
            "ret-1",
            vec![ReturnLine::new("Basmati Rice", Quantity::from_major(3)).with_product_id("p-rice")],
        )]
    }

    fn pay(amount: i64) -> Payment {
        Payment::new(Money::from_major(amount), PaymentMethod::Cash)
    }

    #[test]
    fn test_statement_end_to_end() {
        let statement = build_statement(
            &sale(),
            &returns(),
            &[pay(1000), pay(500)],
            &[],
            &ReconcileOptions::default(),
        )
        .unwrap();

        assert_eq!(statement.original_totals.net_amount, Money::from_major(2124));
        assert_eq!(statement.returns.total_return_value, Money::new(dec!(318.6)));
        assert_eq!(statement.pending_totals.net_amount, Money::new(dec!(1805.4)));
        assert_eq!(statement.settlement.adjusted_invoice_amount, Money::new(dec!(1805.4)));
        assert_eq!(statement.settlement.pending_amount, Money::new(dec!(305.4)));
        assert_eq!(statement.balance_state(), BalanceState::Outstanding);
        assert_eq!(statement.status, SaleStatus::PartiallyPaid);
        assert!(!statement.has_warnings());

        // 2% of 1805.4
        assert_eq!(statement.commission.commission_due, Money::new(dec!(36.108)));
    }

    #[test]
    fn test_overpaid_statement() {
        let statement = build_statement(&sale(), &returns(), &[pay(2000)], &[], &ReconcileOptions::default()).unwrap();
        assert_eq!(statement.settlement.overpaid_amount, Money::new(dec!(194.6)));
        assert_eq!(statement.balance_state(), BalanceState::Overpaid);
    }

    #[test]
    fn test_due_dates() {
        let statement = build_statement(&sale(), &[], &[], &[], &ReconcileOptions::default()).unwrap();
        assert_eq!(statement.due_date, date(2024, 3, 31));
        assert_eq!(statement.days_past_due(date(2024, 4, 5)), 5);
        assert_eq!(statement.days_past_due(date(2024, 3, 29)), -2);
        assert!(statement.is_past_due(date(2024, 4, 1)));
        assert!(!statement.is_past_due(date(2024, 3, 31)));
    }

    #[test]
    fn test_stored_totals_drift_is_a_warning() {
        let mut drifted = sale();
        drifted.invoice_tax_amount = Some(Money::from_major(360));
        let statement = build_statement(&drifted, &returns(), &[], &[], &ReconcileOptions::default()).unwrap();

        assert_eq!(statement.warnings.len(), 1);
        match &statement.warnings[0] {
            StatementWarning::StoredTotalsMismatch { drift } => {
                assert_eq!(drift.field, "taxAmount");
                assert_eq!(drift.computed, Money::from_major(324));
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn test_computed_net_used_without_stored_totals() {
        let mut draft = sale();
        draft.invoice_gross_amount = None;
        draft.invoice_discount_amount = None;
        draft.invoice_tax_amount = None;
        draft.invoice_net_amount = None;

        let statement = build_statement(&draft, &returns(), &[], &[], &ReconcileOptions::default()).unwrap();
        assert!(statement.stored_totals.is_none());
        assert_eq!(statement.settlement.adjusted_invoice_amount, Money::new(dec!(1805.4)));
    }

    #[test]
    fn test_over_return_surfaces_on_statement() {
        let options = ReconcileOptions {
            basis: QuantityBasis::Gross,
            ..Default::default()
        };
        let batches = vec![GoodsReturnBatch::new(
            "ret-1",
            vec![ReturnLine::new("Basmati Rice", Quantity::from_major(8)).with_product_id("p-rice")],
        )];
        let statement = build_statement(&sale(), &batches, &[], &[], &options).unwrap();
        assert!(statement.warnings.iter().any(|w| matches!(
            w,
            StatementWarning::Returns { warning: ReconcileWarning::OverReturn { .. } }
        )));
    }

    #[test]
    fn test_rejects_invalid_sale() {
        let mut bad = sale();
        bad.buyer_id = bad.seller_id.clone();
        let err = build_statement(&bad, &[], &[], &[], &ReconcileOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_oversized_inputs_are_errors() {
        let mut bad = sale();
        bad.products[0].rate = Money::new(crate::MAX_RATE + dec!(1));
        let err = build_statement(&bad, &[], &[], &[], &ReconcileOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::TooLarge { .. })));

        let huge = Payment::new(Money::new(crate::MAX_AMOUNT * dec!(2)), PaymentMethod::Cash);
        let err = build_statement(&sale(), &returns(), &[huge], &[], &ReconcileOptions::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::TooLarge { .. })));
    }

    #[test]
    fn test_commission_paid_separately_from_buyer_balance() {
        let commission = Payment::new(Money::from_major(30), PaymentMethod::OnlinePayment);
        let statement = build_statement(
            &sale(),
            &returns(),
            &[pay(1805)],
            &[commission],
            &ReconcileOptions::default(),
        )
        .unwrap();
        assert_eq!(statement.settlement.pending_amount, Money::new(dec!(0.4)));
        assert_eq!(statement.commission.pending_amount, Money::new(dec!(6.108)));
    }
}
