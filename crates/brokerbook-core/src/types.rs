//! # Domain Types
//!
//! Data contracts shared with the REST backend and the dashboard.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sale       │   │   ProductLine   │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  invoiceNumber  │◄──│  name / id      │   │  amount         │       │
//! │  │  sellerId       │   │  quantity       │   │  paymentMethod  │       │
//! │  │  buyerId        │   │  rate           │   │  referenceNumber│       │
//! │  │  products[]     │   │  gstRate        │   │  createdAt      │       │
//! │  │  invoice*Amount │   │  discountRate   │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘   (Commission: same shape)  │
//! │                                ▲                                        │
//! │  ┌─────────────────┐   ┌───────┴─────────┐                              │
//! │  │GoodsReturnBatch │──►│   ReturnLine    │  joins by productId,         │
//! │  │  id, notes      │   │  productName    │  falling back to name        │
//! │  └─────────────────┘   │  quantity       │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All records use camelCase on the wire, matching the backend JSON.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;

// =============================================================================
// Percent
// =============================================================================

/// A percentage expressed in percent units (18 = 18%).
///
/// Valid business rates are in [0, 100]; the type itself does not enforce
/// it so that bad backend data can be reported instead of rejected at
/// deserialization time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Percent(#[ts(type = "string")] Decimal);

impl Percent {
    /// 0%.
    pub const ZERO: Percent = Percent(Decimal::ZERO);

    /// 100%.
    pub const FULL: Percent = Percent(Decimal::ONE_HUNDRED);

    /// Creates a percent from a decimal value in percent units.
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Percent(value)
    }

    /// Creates a whole-number percent (`from_major(18)` = 18%).
    #[inline]
    pub fn from_major(value: i64) -> Self {
        Percent(Decimal::from(value))
    }

    /// Returns the value in percent units.
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true when the value lies in [0, 100].
    #[inline]
    pub fn is_in_range(&self) -> bool {
        self.0 >= Decimal::ZERO && self.0 <= Decimal::ONE_HUNDRED
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// A (possibly fractional) quantity of goods: 10 pcs, 2.5 kg.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Quantity(#[ts(type = "string")] Decimal);

impl Quantity {
    /// Zero quantity (a fully returned line).
    pub const ZERO: Quantity = Quantity(Decimal::ZERO);

    /// Wraps a decimal quantity.
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Quantity(value)
    }

    /// Creates a whole-number quantity.
    #[inline]
    pub fn from_major(value: i64) -> Self {
        Quantity(Decimal::from(value))
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::ZERO, Add::add)
    }
}

// =============================================================================
// Product Line
// =============================================================================

/// One sellable item on an invoice.
///
/// Owned by a [`Sale`]. Mutable while the sale is being drafted; the backend
/// treats it as immutable once the sale is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductLine {
    /// Backend identifier (absent on lines that were never saved).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name. Also the legacy join key for goods returns.
    pub name: String,

    /// Quantity currently stored on the sale.
    pub quantity: Quantity,

    /// Unit label shown next to the quantity ("kg", "pcs").
    #[serde(default)]
    pub unit: String,

    /// Price per unit.
    pub rate: Money,

    /// GST percent, applied to the post-discount amount.
    #[serde(default)]
    pub gst_rate: Percent,

    /// Discount percent, applied to `quantity × rate`.
    #[serde(default)]
    pub discount_rate: Percent,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ProductLine {
    /// Creates a line with no discount and no GST.
    pub fn new(name: impl Into<String>, quantity: Quantity, rate: Money) -> Self {
        ProductLine {
            id: None,
            name: name.into(),
            quantity,
            unit: String::new(),
            rate,
            gst_rate: Percent::ZERO,
            discount_rate: Percent::ZERO,
            notes: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_discount(mut self, discount_rate: Percent) -> Self {
        self.discount_rate = discount_rate;
        self
    }

    pub fn with_gst(mut self, gst_rate: Percent) -> Self {
        self.gst_rate = gst_rate;
        self
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// Payment status as reported by the backend.
///
/// This crate never derives the status; it only exposes the numbers the
/// dashboard shows next to whatever status it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    #[default]
    Pending,
    PartiallyPaid,
    Paid,
    Overdue,
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleStatus::Pending => write!(f, "PENDING"),
            SaleStatus::PartiallyPaid => write!(f, "PARTIALLY_PAID"),
            SaleStatus::Paid => write!(f, "PAID"),
            SaleStatus::Overdue => write!(f, "OVERDUE"),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Cheque,
    OnlinePayment,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale (invoice) between a seller and a buyer, brokered by the tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub invoice_number: String,
    #[ts(as = "String")]
    pub invoice_date: NaiveDate,
    /// Credit period in days after `invoice_date`.
    #[serde(default)]
    pub due_days: u32,
    /// Broker commission percent.
    #[serde(default)]
    pub commission_rate: Percent,
    #[serde(default)]
    pub status: SaleStatus,
    pub seller_id: String,
    pub buyer_id: String,
    #[serde(default)]
    pub products: Vec<ProductLine>,

    // Totals as recorded by the backend when the sale was created.
    // Absent on drafts.
    #[serde(default)]
    pub invoice_gross_amount: Option<Money>,
    #[serde(default)]
    pub invoice_discount_amount: Option<Money>,
    #[serde(default)]
    pub invoice_tax_amount: Option<Money>,
    #[serde(default)]
    pub invoice_net_amount: Option<Money>,
}

impl Sale {
    /// Decodes a sale from backend JSON.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `invoice_date + due_days`.
    pub fn due_date(&self) -> NaiveDate {
        self.invoice_date
            .checked_add_days(Days::new(u64::from(self.due_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Days elapsed since the due date (negative while not yet due).
    pub fn days_past_due(&self, today: NaiveDate) -> i64 {
        (today - self.due_date()).num_days()
    }
}

// =============================================================================
// Goods Returns
// =============================================================================

/// One returned product inside a [`GoodsReturnBatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnLine {
    /// Id of the original product line, when the backend supplies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub product_name: String,
    pub quantity: Quantity,
}

impl ReturnLine {
    pub fn new(product_name: impl Into<String>, quantity: Quantity) -> Self {
        ReturnLine {
            product_id: None,
            product_name: product_name.into(),
            quantity,
        }
    }

    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }
}

/// A recorded return event against a sale. Always dated after the sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GoodsReturnBatch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<ReturnLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl GoodsReturnBatch {
    pub fn new(id: impl Into<String>, lines: Vec<ReturnLine>) -> Self {
        GoodsReturnBatch {
            id: id.into(),
            notes: None,
            lines,
            created_at: None,
        }
    }

    /// Decodes a batch from backend JSON.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Money received from the buyer against a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Payment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn new(amount: Money, payment_method: PaymentMethod) -> Self {
        Payment {
            id: None,
            amount,
            payment_method,
            reference_number: None,
            created_at: None,
        }
    }

    pub fn with_reference(mut self, reference_number: impl Into<String>) -> Self {
        self.reference_number = Some(reference_number.into());
        self
    }

    /// Decodes a payment from backend JSON.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Money paid to the broker. Same shape as [`Payment`]; tracked separately
/// and never subtracted from the buyer's balance.
pub type Commission = Payment;

// =============================================================================
// Unit Tests
// =============================================================================
