//! # Validation Module
//!
//! Input validation for everything that enters the reconciliation engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard forms (TypeScript)                                 │
//! │  └── Immediate feedback while typing                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── rates in [0, 100]         → InvalidRate                           │
//! │  ├── quantity / rate ≥ 0       → NegativeQuantity / NegativeRate       │
//! │  ├── payment amounts ≥ 0       → NegativeAmount                        │
//! │  ├── magnitudes ≤ MAX_*        → TooLarge                              │
//! │  └── seller ≠ buyer            → SameParty                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: REST backend (external, source of truth)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names in errors are JSON paths (`products[2].gstRate`) so the
//! dashboard can highlight the offending input.
//!
//! ## Usage
//! ```rust
//! use brokerbook_core::types::Percent;
//! use brokerbook_core::validation::validate_percent;
//!
//! assert!(validate_percent("gstRate", Percent::from_major(18)).is_ok());
//! assert!(validate_percent("gstRate", Percent::from_major(118)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{GoodsReturnBatch, Payment, Percent, ProductLine, Quantity, ReturnLine, Sale};
use crate::{MAX_AMOUNT, MAX_PRODUCT_NAME_LEN, MAX_QUANTITY, MAX_RATE};
use rust_decimal::Decimal;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Scalar Validators
// =============================================================================

/// Rejects percents outside [0, 100].
pub fn validate_percent(field: &str, percent: Percent) -> ValidationResult<()> {
    if !percent.is_in_range() {
        return Err(ValidationError::InvalidRate {
            field: field.to_string(),
            value: percent.value(),
        });
    }

    Ok(())
}

/// Rejects negative quantities and quantities above [`MAX_QUANTITY`].
/// Zero is allowed (fully returned line).
pub fn validate_quantity(field: &str, quantity: Quantity) -> ValidationResult<()> {
    if quantity.is_negative() {
        return Err(ValidationError::NegativeQuantity {
            field: field.to_string(),
            value: quantity.value(),
        });
    }

    at_most(field, quantity.value(), MAX_QUANTITY)
}

/// Rejects negative unit rates. Zero is allowed (free goods).
pub fn validate_rate(field: &str, rate: Money) -> ValidationResult<()> {
    if rate.is_negative() {
        return Err(ValidationError::NegativeRate {
            field: field.to_string(),
            value: rate.amount(),
        });
    }

    at_most(field, rate.amount(), MAX_RATE)
}

/// Rejects negative amounts (payments, commissions, invoice totals).
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
            value: amount.amount(),
        });
    }

    at_most(field, amount.amount(), MAX_AMOUNT)
}

// Upper bounds keep every product, sum and percent of validated input
// inside Decimal's range.
fn at_most(field: &str, value: Decimal, max: Decimal) -> ValidationResult<()> {
    if value > max {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max,
            value,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_PRODUCT_NAME_LEN`] characters
pub fn validate_product_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates one product line. `path` prefixes every field name,
/// e.g. `products[2]`.
///
/// ## Checks (in order)
/// name → quantity → rate → discountRate → gstRate
pub fn validate_product_line(path: &str, line: &ProductLine) -> ValidationResult<()> {
    validate_product_name(&format!("{path}.name"), &line.name)?;
    validate_quantity(&format!("{path}.quantity"), line.quantity)?;
    validate_rate(&format!("{path}.rate"), line.rate)?;
    validate_percent(&format!("{path}.discountRate"), line.discount_rate)?;
    validate_percent(&format!("{path}.gstRate"), line.gst_rate)?;
    Ok(())
}

/// Validates every product line of a sale, stopping at the first failure.
pub fn validate_product_lines(lines: &[ProductLine]) -> ValidationResult<()> {
    for (index, line) in lines.iter().enumerate() {
        validate_product_line(&format!("products[{index}]"), line)?;
    }
    Ok(())
}

/// Validates one return line.
pub fn validate_return_line(path: &str, line: &ReturnLine) -> ValidationResult<()> {
    validate_product_name(&format!("{path}.productName"), &line.product_name)?;
    validate_quantity(&format!("{path}.quantity"), line.quantity)?;
    Ok(())
}

/// Validates every line of a goods-return batch.
pub fn validate_return_batch(batch: &GoodsReturnBatch) -> ValidationResult<()> {
    require("returns.id", &batch.id)?;
    for (index, line) in batch.lines.iter().enumerate() {
        validate_return_line(&format!("returns[{}].lines[{index}]", batch.id), line)?;
    }
    Ok(())
}

/// Validates payment (or commission) amounts. `collection` names the list,
/// e.g. `payments` or `commissions`.
pub fn validate_payments(collection: &str, payments: &[Payment]) -> ValidationResult<()> {
    for (index, payment) in payments.iter().enumerate() {
        validate_amount(&format!("{collection}[{index}].amount"), payment.amount)?;
    }
    Ok(())
}

/// Validates a sale header and its product lines.
///
/// ## Rules
/// - `invoiceNumber`, `sellerId`, `buyerId` are required
/// - `sellerId ≠ buyerId`
/// - `commissionRate` in [0, 100]
/// - every product line valid
/// - stored totals, when present, are not negative
pub fn validate_sale(sale: &Sale) -> ValidationResult<()> {
    require("invoiceNumber", &sale.invoice_number)?;
    require("sellerId", &sale.seller_id)?;
    require("buyerId", &sale.buyer_id)?;

    if sale.seller_id == sale.buyer_id {
        return Err(ValidationError::SameParty {
            party_id: sale.seller_id.clone(),
        });
    }

    validate_percent("commissionRate", sale.commission_rate)?;
    validate_product_lines(&sale.products)?;

    let stored = [
        ("invoiceGrossAmount", sale.invoice_gross_amount),
        ("invoiceDiscountAmount", sale.invoice_discount_amount),
        ("invoiceTaxAmount", sale.invoice_tax_amount),
        ("invoiceNetAmount", sale.invoice_net_amount),
    ];
    for (field, amount) in stored {
        if let Some(amount) = amount {
            validate_amount(field, amount)?;
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn line() -> ProductLine {
        ProductLine::new("Basmati Rice", Quantity::from_major(10), Money::from_major(100))
            .with_discount(Percent::from_major(10))
            .with_gst(Percent::from_major(18))
    }

    fn sale() -> Sale {
        Sale {
            id: "sale-1".to_string(),
            invoice_number: "INV-1".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            due_days: 30,
            commission_rate: Percent::from_major(2),
            status: Default::default(),
            seller_id: "seller".to_string(),
            buyer_id: "buyer".to_string(),
            products: vec![line()],
            invoice_gross_amount: None,
            invoice_discount_amount: None,
            invoice_tax_amount: None,
            invoice_net_amount: None,
        }
    }

    #[test]
    fn test_validate_percent() {
        assert!(validate_percent("r", Percent::ZERO).is_ok());
        assert!(validate_percent("r", Percent::FULL).is_ok());
        assert!(validate_percent("r", Percent::new(dec!(12.5))).is_ok());

        let err = validate_percent("r", Percent::new(dec!(-0.5))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRate { .. }));
        assert!(validate_percent("r", Percent::new(dec!(100.0001))).is_err());
    }

    #[test]
    fn test_validate_quantity_and_rate() {
        assert!(validate_quantity("q", Quantity::ZERO).is_ok());
        assert!(validate_quantity("q", Quantity::new(dec!(2.5))).is_ok());
        assert!(matches!(
            validate_quantity("q", Quantity::from_major(-1)),
            Err(ValidationError::NegativeQuantity { .. })
        ));

        assert!(validate_rate("rate", Money::ZERO).is_ok());
        assert!(matches!(
            validate_rate("rate", Money::from_minor(-1)),
            Err(ValidationError::NegativeRate { .. })
        ));
    }

    #[test]
    fn test_validate_upper_bounds() {
        assert!(validate_quantity("q", Quantity::new(MAX_QUANTITY)).is_ok());
        assert!(matches!(
            validate_quantity("q", Quantity::new(MAX_QUANTITY + dec!(0.001))),
            Err(ValidationError::TooLarge { .. })
        ));

        assert!(validate_rate("rate", Money::new(MAX_RATE)).is_ok());
        assert!(validate_amount("amount", Money::new(MAX_AMOUNT)).is_ok());
        assert!(matches!(
            validate_amount("amount", Money::new(MAX_AMOUNT + dec!(0.01))),
            Err(ValidationError::TooLarge { .. })
        ));

        let rate = Money::new(Decimal::from_i128_with_scale(10_i128.pow(23), 0));
        let huge = ProductLine::new("X", Quantity::from_major(1_000_000), rate);
        let err = validate_product_line("products[0]", &huge).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        assert_eq!(err.field(), Some("products[0].rate"));
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("name", "Basmati Rice").is_ok());
        assert!(validate_product_name("name", "   ").is_err());
        assert!(validate_product_name("name", &"A".repeat(MAX_PRODUCT_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_product_line_reports_path() {
        let bad = line().with_gst(Percent::from_major(118));
        let err = validate_product_lines(&[line(), bad]).unwrap_err();
        assert_eq!(err.field(), Some("products[1].gstRate"));

        let mut bad = line();
        bad.discount_rate = Percent::from_major(101);
        let err = validate_product_line("product", &bad).unwrap_err();
        assert_eq!(err.field(), Some("product.discountRate"));
    }

    #[test]
    fn test_validate_return_batch() {
        let ok = GoodsReturnBatch::new("ret-1", vec![ReturnLine::new("Basmati Rice", Quantity::from_major(3))]);
        assert!(validate_return_batch(&ok).is_ok());

        let bad = GoodsReturnBatch::new("ret-2", vec![ReturnLine::new("Basmati Rice", Quantity::from_major(-3))]);
        let err = validate_return_batch(&bad).unwrap_err();
        assert_eq!(err.field(), Some("returns[ret-2].lines[0].quantity"));
    }

    #[test]
    fn test_validate_payments() {
        let payments = vec![
            Payment::new(Money::from_major(100), PaymentMethod::Cash),
            Payment::new(Money::from_major(-1), PaymentMethod::Cheque),
        ];
        let err = validate_payments("payments", &payments).unwrap_err();
        assert_eq!(err.field(), Some("payments[1].amount"));
        assert!(validate_payments("payments", &[]).is_ok());
    }

    #[test]
    fn test_validate_sale() {
        assert!(validate_sale(&sale()).is_ok());

        let mut same = sale();
        same.buyer_id = same.seller_id.clone();
        assert!(matches!(
            validate_sale(&same),
            Err(ValidationError::SameParty { .. })
        ));

        let mut missing = sale();
        missing.invoice_number = " ".to_string();
        assert_eq!(validate_sale(&missing).unwrap_err().field(), Some("invoiceNumber"));

        let mut commission = sale();
        commission.commission_rate = Percent::from_major(150);
        assert_eq!(
            validate_sale(&commission).unwrap_err().field(),
            Some("commissionRate")
        );

        let mut negative_total = sale();
        negative_total.invoice_net_amount = Some(Money::from_major(-10));
        assert_eq!(
            validate_sale(&negative_total).unwrap_err().field(),
            Some("invoiceNetAmount")
        );
    }
}
