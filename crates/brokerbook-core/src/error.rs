//! # Error Types
//!
//! Domain-specific error types for brokerbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  brokerbook-core errors (this file)                                    │
//! │  ├── CoreError        - Reconciliation / decoding failures             │
//! │  └── ValidationError  - Input validation failures (rates, quantities)  │
//! │                                                                         │
//! │  Non-fatal conditions are NOT errors:                                  │
//! │  ├── ReconcileWarning - over-return, ambiguous name join               │
//! │  └── TotalsDrift      - stored totals differ from recomputed ones      │
//! │                                                                         │
//! │  brokerbook-notify errors (separate crate)                             │
//! │  └── NotifyError      - config, snapshot, hub failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → NotifyError → log line / UI       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validation error names the offending field path
//! (`products[2].gstRate`) and, where there is one, the rejected value.
//! Nothing is clamped silently.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core reconciliation errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A return line names a product that is not on the sale.
    ///
    /// ## When This Occurs
    /// - The product was renamed after the return was recorded
    /// - The return belongs to a different sale
    ///
    /// The return's value cannot be derived without the original line's
    /// rate, discount and GST, so this is fatal for the reconciliation.
    #[error("Return batch {batch_id} references unknown product '{product_name}'")]
    UnmatchedReturnLine {
        batch_id: String,
        product_name: String,
    },

    /// Recomputed totals differ from an expected (stored) total.
    #[error("{field}: expected {expected}, computed {computed}")]
    TotalsMismatch {
        field: String,
        expected: Money,
        computed: Money,
    },

    /// Backend payload could not be decoded.
    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the boundary, before any valuation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Discount, GST or commission percent outside [0, 100].
    #[error("{field} must be between 0 and 100, got {value}")]
    InvalidRate { field: String, value: Decimal },

    /// Quantity below zero.
    #[error("{field} must not be negative, got {value}")]
    NegativeQuantity { field: String, value: Decimal },

    /// Unit rate below zero.
    #[error("{field} must not be negative, got {value}")]
    NegativeRate { field: String, value: Decimal },

    /// Payment, commission or invoice amount below zero.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: String, value: Decimal },

    /// Quantity, rate or amount above the accepted maximum.
    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: String,
        max: Decimal,
        value: Decimal,
    },

    /// Seller and buyer are the same party.
    #[error("seller and buyer must be different parties, both are '{party_id}'")]
    SameParty { party_id: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Returns the field path the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidRate { field, .. }
            | ValidationError::NegativeQuantity { field, .. }
            | ValidationError::NegativeRate { field, .. }
            | ValidationError::NegativeAmount { field, .. }
            | ValidationError::TooLarge { field, .. }
            | ValidationError::NotAllowed { field, .. } => Some(field.as_str()),
            ValidationError::SameParty { .. } => None,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnmatchedReturnLine {
            batch_id: "ret-1".to_string(),
            product_name: "Basmati".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Return batch ret-1 references unknown product 'Basmati'"
        );

        let err = CoreError::TotalsMismatch {
            field: "netAmount".to_string(),
            expected: Money::from_major(2124),
            computed: Money::new(dec!(2123.5)),
        };
        assert_eq!(err.to_string(), "netAmount: expected 2124.00, computed 2123.50");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::InvalidRate {
            field: "products[0].gstRate".to_string(),
            value: dec!(118),
        };
        assert_eq!(
            err.to_string(),
            "products[0].gstRate must be between 0 and 100, got 118"
        );

        let err = ValidationError::NegativeQuantity {
            field: "products[1].quantity".to_string(),
            value: dec!(-2),
        };
        assert_eq!(err.to_string(), "products[1].quantity must not be negative, got -2");
        assert_eq!(err.field(), Some("products[1].quantity"));

        let err = ValidationError::TooLarge {
            field: "products[0].rate".to_string(),
            max: dec!(1000000000),
            value: Decimal::from_i128_with_scale(10_i128.pow(23), 0),
        };
        assert_eq!(
            err.to_string(),
            "products[0].rate must be at most 1000000000, got 100000000000000000000000"
        );
        assert_eq!(err.field(), Some("products[0].rate"));

        let err = ValidationError::SameParty {
            party_id: "acme".to_string(),
        };
        assert!(err.field().is_none());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "invoiceNumber".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
