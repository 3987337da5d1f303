//! # brokerbook-core: Invoice Reconciliation for Brokerbook
//!
//! Every money figure Brokerbook shows (line totals, invoice totals,
//! return values, outstanding and overpaid balances, commission) is
//! computed here, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Brokerbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   Dashboard (TypeScript)                        │   │
//! │  │   Sale form ──► Invoice table ──► Returns ──► Payments         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ts-rs bindings / JSON                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ brokerbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ valuation │  │  invoice  │  │  returns  │  │settlement │  │   │
//! │  │   │ one line  │  │  totals   │  │ reconcile │  │ balances  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                         statement                              │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO LOGGING • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            brokerbook-notify (payment reminders)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Backend contracts (Sale, ProductLine, GoodsReturnBatch, Payment)
//! - [`money`] - Decimal money type and the percent / rounding primitives
//! - [`valuation`] - Per-line amount, discount, GST and total
//! - [`invoice`] - Invoice totals and verification against stored totals
//! - [`returns`] - Goods-return reconciliation
//! - [`settlement`] - Buyer and commission balances
//! - [`statement`] - Everything above for one sale in a single call
//! - [`validation`] - Input checks at the boundary
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; safe to call on every keystroke
//! 2. **No I/O**: REST, file system and environment access are FORBIDDEN here
//! 3. **Exact Decimals**: no floats; round to 2 places only for display
//! 4. **Explicit Errors**: typed errors for bad input, typed warnings for odd data
//!
//! ## Example Usage
//!
//! ```rust
//! use brokerbook_core::invoice::aggregate;
//! use brokerbook_core::money::Money;
//! use brokerbook_core::types::{Percent, ProductLine, Quantity};
//!
//! let line = ProductLine::new("Basmati Rice", Quantity::from_major(10), Money::from_major(100))
//!     .with_discount(Percent::from_major(10))
//!     .with_gst(Percent::from_major(18));
//!
//! let totals = aggregate(&[line.clone(), line]);
//! assert_eq!(totals.net_amount.to_string(), "2124.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod money;
pub mod returns;
pub mod settlement;
pub mod statement;
pub mod types;
pub mod validation;
pub mod valuation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use brokerbook_core::Money` instead of
// `use brokerbook_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{aggregate, InvoiceTotals, TotalsDrift};
pub use money::Money;
pub use returns::{reconcile_returns, JoinPolicy, QuantityBasis, ReconcileOptions, ReconcileWarning};
pub use settlement::{settle_commission, settle_payments, BalanceState, CommissionSettlement, Settlement};
pub use statement::{build_statement, SaleStatement, StatementWarning};
pub use types::*;
pub use valuation::{value_line, LineValuation};

use rust_decimal::Decimal;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum characters in a product name.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Largest quantity accepted on a product or return line.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest unit rate accepted on a product line.
pub const MAX_RATE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest payment, commission or invoice total. A single line at
/// `MAX_QUANTITY` and `MAX_RATE` stays within it.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA764_0000, 0x0DE0_B6B3, 0, false, 0);

/// Tolerance when comparing recomputed totals with stored backend totals,
/// which were rounded to 2 places before being saved.
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Tolerance for `net = gross − discount + tax`.
pub const IDENTITY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);
