//! # Reminder Scanner
//!
//! Builds a statement for every sale and decides which reminders are due.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  condition                                   kind                to     │
//! │  ─────────────────────────────────────────  ──────────────────  ──────  │
//! │  pending > 0, today > due                    PAYMENT_OVERDUE     buyer  │
//! │  pending > 0, 0 ≤ due − today ≤ soon_days    PAYMENT_DUE_SOON    buyer  │
//! │  overpaid > 0                                OVERPAID            seller │
//! │  balance not outstanding, commission > 0     COMMISSION_PENDING  seller │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Overdue reminders repeat every `overdue_repeat_days`; the others fire
//! once per figure. Repetition is controlled through the dedup key, the
//! hub drops anything it already holds.

use brokerbook_core::{
    build_statement, BalanceState, Commission, CoreResult, GoodsReturnBatch, Money, Payment,
    ReconcileOptions, Sale, SaleStatement,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{NotifyConfig, ReminderSettings};
use crate::notification::{Notification, NotificationKind};

/// A sale with everything recorded against it, as exported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleAccount {
    pub sale: Sale,
    #[serde(default)]
    pub returns: Vec<GoodsReturnBatch>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub commissions: Vec<Commission>,
}

impl SaleAccount {
    pub fn new(sale: Sale) -> Self {
        SaleAccount {
            sale,
            returns: Vec::new(),
            payments: Vec::new(),
            commissions: Vec::new(),
        }
    }

    pub fn statement(&self, options: &ReconcileOptions) -> CoreResult<SaleStatement> {
        build_statement(
            &self.sale,
            &self.returns,
            &self.payments,
            &self.commissions,
            options,
        )
    }
}

/// A sale the scanner could not reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSale {
    pub sale_id: String,
    pub reason: String,
}

/// Outcome of one scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub notifications: Vec<Notification>,
    pub skipped: Vec<SkippedSale>,
}

pub struct ReminderScanner {
    tenant_id: String,
    settings: ReminderSettings,
    options: ReconcileOptions,
}

impl ReminderScanner {
    pub fn new(config: &NotifyConfig) -> Self {
        ReminderScanner {
            tenant_id: config.tenant.id.clone(),
            settings: config.reminders.clone(),
            options: config.reconcile,
        }
    }

    /// Scans every account. A sale that fails to reconcile is logged and
    /// skipped; it never stops the scan.
    pub fn scan(&self, accounts: &[SaleAccount], today: NaiveDate) -> ScanReport {
        let mut report = ScanReport::default();

        for account in accounts {
            match account.statement(&self.options) {
                Ok(statement) => {
                    for warning in &statement.warnings {
                        warn!(
                            sale_id = %statement.sale_id,
                            invoice = %statement.invoice_number,
                            %warning,
                            "Statement warning"
                        );
                    }
                    report
                        .notifications
                        .extend(self.reminders_for(&account.sale, &statement, today));
                }
                Err(e) => {
                    warn!(sale_id = %account.sale.id, error = %e, "Skipping sale that failed to reconcile");
                    report.skipped.push(SkippedSale {
                        sale_id: account.sale.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            accounts = accounts.len(),
            reminders = report.notifications.len(),
            skipped = report.skipped.len(),
            "Scan complete"
        );
        report
    }

    /// Reminders due for one reconciled sale.
    pub fn reminders_for(
        &self,
        sale: &Sale,
        statement: &SaleStatement,
        today: NaiveDate,
    ) -> Vec<Notification> {
        let mut out = Vec::new();
        let settlement = &statement.settlement;
        let invoice = &statement.invoice_number;

        if settlement.pending_amount.is_positive() {
            let days_past_due = statement.days_past_due(today);
            let pending = settlement.pending_amount.round2();

            if days_past_due > 0 {
                let bucket = (days_past_due - 1) / i64::from(self.settings.overdue_repeat_days.max(1));
                out.push(
                    self.notify(
                        &sale.buyer_id,
                        NotificationKind::PaymentOverdue,
                        statement,
                        pending,
                        format!("Invoice {invoice} is {days_past_due} day(s) overdue: {pending} outstanding"),
                    )
                    .with_dedup_key(format!("{}:overdue:{bucket}", sale.id)),
                );
            } else if -days_past_due <= i64::from(self.settings.due_soon_days) {
                let due = statement.due_date;
                out.push(
                    self.notify(
                        &sale.buyer_id,
                        NotificationKind::PaymentDueSoon,
                        statement,
                        pending,
                        format!("Invoice {invoice} is due on {due}: {pending} outstanding"),
                    )
                    .with_dedup_key(format!("{}:due-soon:{due}", sale.id)),
                );
            }
        }

        if settlement.overpaid_amount.is_positive() {
            let overpaid = settlement.overpaid_amount.round2();
            out.push(
                self.notify(
                    &sale.seller_id,
                    NotificationKind::Overpaid,
                    statement,
                    overpaid,
                    format!("Invoice {invoice} is overpaid by {overpaid}"),
                )
                .with_dedup_key(format!("{}:overpaid:{overpaid}", sale.id)),
            );
        }

        let commission = &statement.commission;
        if self.settings.include_commissions
            && statement.balance_state() != BalanceState::Outstanding
            && commission.pending_amount.is_positive()
        {
            let pending = commission.pending_amount.round2();
            out.push(
                self.notify(
                    &sale.seller_id,
                    NotificationKind::CommissionPending,
                    statement,
                    pending,
                    format!("Commission on invoice {invoice} unpaid: {pending}"),
                )
                .with_dedup_key(format!("{}:commission:{pending}", sale.id)),
            );
        }

        out
    }

    fn notify(
        &self,
        recipient: &str,
        kind: NotificationKind,
        statement: &SaleStatement,
        amount: Money,
        message: String,
    ) -> Notification {
        Notification::new(
            self.tenant_id.as_str(),
            recipient,
            kind,
            statement.sale_id.as_str(),
            statement.invoice_number.as_str(),
            amount,
            message,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokerbook_core::{PaymentMethod, Percent, ProductLine, Quantity, ReturnLine, SaleStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Net 2124, 3 units returned (318.60), due 2024-03-31.
    fn account(paid: &[i64]) -> SaleAccount {
        let line = ProductLine::new("Basmati Rice", Quantity::from_major(10), Money::from_major(100))
            .with_discount(Percent::from_major(10))
            .with_gst(Percent::from_major(18));
        let mut held = line.clone();
        held.name = "Sona Masoori".to_string();
        held.quantity = Quantity::from_major(7);

        let sale = Sale {
            id: "sale-1".to_string(),
            invoice_number: "INV-1".to_string(),
            invoice_date: date(2024, 3, 1),
            due_days: 30,
            commission_rate: Percent::from_major(2),
            status: SaleStatus::Pending,
            seller_id: "seller-1".to_string(),
            buyer_id: "buyer-1".to_string(),
            products: vec![held, line],
            invoice_gross_amount: None,
            invoice_discount_amount: None,
            invoice_tax_amount: None,
            invoice_net_amount: Some(Money::from_major(2124)),
        };

        let mut account = SaleAccount::new(sale);
        account.returns = vec![GoodsReturnBatch::new(
            "ret-1",
            vec![ReturnLine::new("Sona Masoori", Quantity::from_major(3))],
        )];
        account.payments = paid
            .iter()
            .map(|&p| Payment::new(Money::from_major(p), PaymentMethod::Cash))
            .collect();
        account
    }

    fn scanner() -> ReminderScanner {
        let mut config = NotifyConfig::default();
        config.tenant.id = "acme".to_string();
        ReminderScanner::new(&config)
    }

    fn kinds(report: &ScanReport) -> Vec<NotificationKind> {
        report.notifications.iter().map(|n| n.kind).collect()
    }

    #[test]
    fn test_overdue() {
        let report = scanner().scan(&[account(&[1000, 500])], date(2024, 4, 5));
        assert_eq!(kinds(&report), vec![NotificationKind::PaymentOverdue]);

        let n = &report.notifications[0];
        assert_eq!(n.recipient_id, "buyer-1");
        assert_eq!(n.tenant_id, "acme");
        assert_eq!(n.amount, Money::from_minor(30540));
        assert_eq!(n.dedup_key, "sale-1:overdue:0");
        assert!(n.message.contains("5 day(s) overdue"));
    }

    #[test]
    fn test_overdue_repeats_per_bucket() {
        let s = scanner();
        let day_7 = s.scan(&[account(&[])], date(2024, 4, 7));
        let day_8 = s.scan(&[account(&[])], date(2024, 4, 8));
        assert_eq!(day_7.notifications[0].dedup_key, "sale-1:overdue:0");
        assert_eq!(day_8.notifications[0].dedup_key, "sale-1:overdue:1");
    }

    #[test]
    fn test_due_soon_window() {
        let s = scanner();
        let report = s.scan(&[account(&[])], date(2024, 3, 28));
        assert_eq!(kinds(&report), vec![NotificationKind::PaymentDueSoon]);
        assert_eq!(report.notifications[0].dedup_key, "sale-1:due-soon:2024-03-31");

        // due date itself is still "due soon", not overdue
        let report = s.scan(&[account(&[])], date(2024, 3, 31));
        assert_eq!(kinds(&report), vec![NotificationKind::PaymentDueSoon]);

        let report = s.scan(&[account(&[])], date(2024, 3, 27));
        assert!(report.notifications.is_empty());
    }

    #[test]
    fn test_overpaid_and_commission() {
        let report = scanner().scan(&[account(&[2000])], date(2024, 4, 5));
        assert_eq!(
            kinds(&report),
            vec![NotificationKind::Overpaid, NotificationKind::CommissionPending]
        );
        assert_eq!(report.notifications[0].recipient_id, "seller-1");
        assert_eq!(report.notifications[0].dedup_key, "sale-1:overpaid:194.60");
        // 2% of 1805.40
        assert_eq!(report.notifications[1].amount, Money::from_minor(3611));
    }

    #[test]
    fn test_commission_reminders_can_be_disabled() {
        let mut config = NotifyConfig::default();
        config.reminders.include_commissions = false;
        let report = ReminderScanner::new(&config).scan(&[account(&[2000])], date(2024, 4, 5));
        assert_eq!(kinds(&report), vec![NotificationKind::Overpaid]);
    }

    #[test]
    fn test_bad_sale_is_skipped() {
        let mut bad = account(&[]);
        bad.sale.id = "sale-bad".to_string();
        bad.sale.buyer_id = bad.sale.seller_id.clone();

        let report = scanner().scan(&[bad, account(&[])], date(2024, 4, 5));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].sale_id, "sale-bad");
        assert_eq!(report.notifications.len(), 1);
    }

    #[test]
    fn test_account_json() {
        let json = r#"{
            "sale": {
                "id": "s1", "invoiceNumber": "INV-9", "invoiceDate": "2024-01-10",
                "dueDays": 15, "sellerId": "a", "buyerId": "b",
                "products": [{"name": "Oil", "quantity": "2", "rate": "50.5"}]
            },
            "payments": [{"amount": "20", "paymentMethod": "ONLINE_PAYMENT"}]
        }"#;
        let account: SaleAccount = serde_json::from_str(json).unwrap();
        assert!(account.returns.is_empty());

        let statement = account.statement(&ReconcileOptions::default()).unwrap();
        assert_eq!(statement.settlement.pending_amount, Money::from_major(81));
    }
}
