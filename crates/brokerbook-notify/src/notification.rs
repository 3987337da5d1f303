//! # Notification Model
//!
//! What the hub stores and broadcasts.

use brokerbook_core::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Why a notification was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// Buyer balance outstanding, due date within the reminder window.
    PaymentDueSoon,
    /// Buyer balance outstanding past the due date.
    PaymentOverdue,
    /// Buyer paid more than the adjusted invoice amount.
    Overpaid,
    /// Broker commission still unpaid on a settled sale.
    CommissionPending,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::PaymentDueSoon => write!(f, "PAYMENT_DUE_SOON"),
            NotificationKind::PaymentOverdue => write!(f, "PAYMENT_OVERDUE"),
            NotificationKind::Overpaid => write!(f, "OVERPAID"),
            NotificationKind::CommissionPending => write!(f, "COMMISSION_PENDING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub tenant_id: String,
    /// Party the notification is for (buyer or seller id).
    pub recipient_id: String,
    pub kind: NotificationKind,
    pub sale_id: String,
    pub invoice_number: String,
    /// The balance the notification is about, rounded for display.
    pub amount: Money,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    /// Two notifications with the same key are the same reminder.
    pub dedup_key: String,
}

impl Notification {
    /// Creates an unread notification with a fresh id.
    ///
    /// The dedup key defaults to `{sale_id}:{kind}`; reminders that may
    /// legitimately repeat set a finer key with [`with_dedup_key`](Self::with_dedup_key).
    pub fn new(
        tenant_id: impl Into<String>,
        recipient_id: impl Into<String>,
        kind: NotificationKind,
        sale_id: impl Into<String>,
        invoice_number: impl Into<String>,
        amount: Money,
        message: impl Into<String>,
    ) -> Self {
        let sale_id = sale_id.into();
        Notification {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            recipient_id: recipient_id.into(),
            kind,
            dedup_key: format!("{sale_id}:{kind}"),
            sale_id,
            invoice_number: invoice_number.into(),
            amount: amount.round2(),
            message: message.into(),
            created_at: Utc::now(),
            read: false,
        }
    }

    pub fn with_dedup_key(mut self, dedup_key: impl Into<String>) -> Self {
        self.dedup_key = dedup_key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification() {
        let n = Notification::new(
            "acme",
            "buyer-1",
            NotificationKind::PaymentOverdue,
            "sale-1",
            "INV-1",
            Money::from_minor(30540),
            "INV-1 is overdue",
        );
        assert!(!n.read);
        assert_eq!(n.dedup_key, "sale-1:PAYMENT_OVERDUE");
        assert_eq!(n.amount.to_string(), "305.40");

        let n = n.with_dedup_key("sale-1:overdue:0");
        assert_eq!(n.dedup_key, "sale-1:overdue:0");
    }

    #[test]
    fn test_wire_format() {
        let n = Notification::new(
            "acme",
            "seller-1",
            NotificationKind::CommissionPending,
            "sale-1",
            "INV-1",
            Money::from_major(36),
            "commission pending",
        );
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["kind"], "COMMISSION_PENDING");
        assert_eq!(json["recipientId"], "seller-1");
        assert_eq!(json["dedupKey"], "sale-1:COMMISSION_PENDING");

        let back: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(back, n);
    }
}
