//! # Returns Reconciliation
//!
//! Works out, per product line, how much was originally sold, how much came
//! back across every goods-return batch, and how much the buyer still holds.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     reconcile_returns()                                 │
//! │                                                                         │
//! │  products[]        batches[] ── lines[]                                │
//! │      │                            │                                     │
//! │      │        ┌───────────────────┘                                     │
//! │      │        ▼                                                         │
//! │      │   join line → product   (productId, then exact name)            │
//! │      │        │                                                         │
//! │      ▼        ▼                                                         │
//! │  returned[i] += line.quantity   batch.total += value(line @ product)   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  QuantityBasis::NetOfReturns   original = stored + returned            │
//! │                                pending  = stored                       │
//! │  QuantityBasis::Gross          original = stored                       │
//! │                                pending  = stored − returned (⚠ < 0)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! In both bases `pending + returned == original`.
//!
//! Everything is recomputed from scratch on every call. At invoice scale
//! (tens of lines) the O(products × return lines) join is negligible.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::invoice::{aggregate_valuations, InvoiceTotals};
use crate::money::Money;
use crate::types::{GoodsReturnBatch, ProductLine, Quantity, ReturnLine};
use crate::validation::{validate_product_lines, validate_return_batch};
use crate::valuation::LineValuation;

// =============================================================================
// Options
// =============================================================================

/// How a return line finds its original product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum JoinPolicy {
    /// Match `productId` against the line id, fall back to exact name.
    #[default]
    IdThenName,
    /// Exact, case-sensitive name only.
    NameOnly,
}

impl JoinPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinPolicy::IdThenName => "id_then_name",
            JoinPolicy::NameOnly => "name_only",
        }
    }
}

impl fmt::Display for JoinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "id_then_name" => Ok(JoinPolicy::IdThenName),
            "name_only" => Ok(JoinPolicy::NameOnly),
            _ => Err(ValidationError::NotAllowed {
                field: "joinPolicy".to_string(),
                allowed: vec!["id_then_name".to_string(), "name_only".to_string()],
            }),
        }
    }
}

/// What the `quantity` stored on a product line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuantityBasis {
    /// Stored quantity already has returns taken off.
    #[default]
    NetOfReturns,
    /// Stored quantity is what was originally sold.
    Gross,
}

impl QuantityBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityBasis::NetOfReturns => "net_of_returns",
            QuantityBasis::Gross => "gross",
        }
    }
}

impl fmt::Display for QuantityBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantityBasis {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "net_of_returns" => Ok(QuantityBasis::NetOfReturns),
            "gross" => Ok(QuantityBasis::Gross),
            _ => Err(ValidationError::NotAllowed {
                field: "quantityBasis".to_string(),
                allowed: vec!["net_of_returns".to_string(), "gross".to_string()],
            }),
        }
    }
}

/// Policy knobs for [`reconcile_returns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "snake_case")]
#[ts(export)]
pub struct ReconcileOptions {
    pub join: JoinPolicy,
    pub basis: QuantityBasis,
}

// =============================================================================
// Results
// =============================================================================

/// Which key joined a return line to its product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum JoinKey {
    Id,
    Name,
}

/// Reconciled quantities and valuations for one product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductReconciliation {
    /// Position of the line on the sale.
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub name: String,
    pub original_quantity: Quantity,
    pub returned_quantity: Quantity,
    pub pending_quantity: Quantity,
    pub original_valuation: LineValuation,
    pub returned_valuation: LineValuation,
    pub pending_valuation: LineValuation,
}

impl ProductReconciliation {
    /// True when nothing of this line is still held by the buyer.
    pub fn is_fully_returned(&self) -> bool {
        self.pending_quantity.is_zero() && !self.returned_quantity.is_zero()
    }
}

/// One return line valued against its original product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnLineValuation {
    pub product_index: usize,
    pub product_name: String,
    pub quantity: Quantity,
    pub matched_by: JoinKey,
    pub valuation: LineValuation,
}

/// All lines of one goods-return batch, valued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BatchValuation {
    pub batch_id: String,
    pub lines: Vec<ReturnLineValuation>,
    /// Σ line totals.
    pub total: Money,
}

/// Non-fatal conditions found while reconciling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind")]
#[ts(export)]
pub enum ReconcileWarning {
    /// More was returned than was sold; the negative pending figure is kept.
    #[serde(rename_all = "camelCase")]
    OverReturn {
        product_index: usize,
        product_name: String,
        original_quantity: Quantity,
        returned_quantity: Quantity,
        pending_quantity: Quantity,
    },

    /// A return line's name matched several product lines; it was
    /// attributed to the first.
    #[serde(rename_all = "camelCase")]
    AmbiguousProductName {
        batch_id: String,
        product_name: String,
        candidates: Vec<usize>,
    },
}

impl fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileWarning::OverReturn {
                product_name,
                original_quantity,
                returned_quantity,
                ..
            } => write!(
                f,
                "'{product_name}': returned {returned_quantity} of {original_quantity}"
            ),
            ReconcileWarning::AmbiguousProductName {
                batch_id,
                product_name,
                candidates,
            } => write!(
                f,
                "return batch {batch_id}: '{product_name}' matches product lines {candidates:?}"
            ),
        }
    }
}

/// Full result of [`reconcile_returns`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnsReconciliation {
    /// One entry per product line, in sale order.
    pub products: Vec<ProductReconciliation>,
    /// One entry per batch, in input order.
    pub batches: Vec<BatchValuation>,
    /// Σ batch totals.
    pub total_return_value: Money,
    pub warnings: Vec<ReconcileWarning>,
}

impl ReturnsReconciliation {
    /// Totals of the lines as originally sold.
    pub fn original_totals(&self) -> InvoiceTotals {
        aggregate_valuations(self.products.iter().map(|p| p.original_valuation))
    }

    /// Totals of what the buyer still holds.
    pub fn pending_totals(&self) -> InvoiceTotals {
        aggregate_valuations(self.products.iter().map(|p| p.pending_valuation))
    }

    /// Totals of everything returned.
    pub fn returned_totals(&self) -> InvoiceTotals {
        aggregate_valuations(self.products.iter().map(|p| p.returned_valuation))
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn product(&self, index: usize) -> Option<&ProductReconciliation> {
        self.products.get(index)
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

struct Match {
    index: usize,
    key: JoinKey,
    ambiguous: Option<Vec<usize>>,
}

fn find_product(
    products: &[ProductLine],
    batch_id: &str,
    line: &ReturnLine,
    join: JoinPolicy,
) -> CoreResult<Match> {
    if join == JoinPolicy::IdThenName {
        if let Some(product_id) = line.product_id.as_deref() {
            let by_id = products
                .iter()
                .position(|p| p.id.as_deref() == Some(product_id));
            if let Some(index) = by_id {
                return Ok(Match {
                    index,
                    key: JoinKey::Id,
                    ambiguous: None,
                });
            }
        }
    }

    let candidates: Vec<usize> = products
        .iter()
        .enumerate()
        .filter(|(_, p)| p.name == line.product_name)
        .map(|(i, _)| i)
        .collect();

    match candidates.first() {
        None => Err(CoreError::UnmatchedReturnLine {
            batch_id: batch_id.to_string(),
            product_name: line.product_name.clone(),
        }),
        Some(&index) => Ok(Match {
            index,
            key: JoinKey::Name,
            ambiguous: (candidates.len() > 1).then_some(candidates),
        }),
    }
}

/// Reconciles `batches` against the sale's `products`.
///
/// ## Errors
/// - [`CoreError::Validation`] for a bad product or return line
/// - [`CoreError::UnmatchedReturnLine`] when a return line joins no product
///
/// Over-returns and ambiguous names are reported as warnings, not errors.
///
/// ## Example
/// ```rust
/// use brokerbook_core::money::Money;
/// use brokerbook_core::returns::{reconcile_returns, ReconcileOptions};
/// use brokerbook_core::types::{GoodsReturnBatch, ProductLine, Quantity, ReturnLine};
///
/// let products = vec![ProductLine::new("Rice", Quantity::from_major(7), Money::from_major(100))];
/// let batches = vec![GoodsReturnBatch::new(
///     "ret-1",
///     vec![ReturnLine::new("Rice", Quantity::from_major(3))],
/// )];
///
/// let r = reconcile_returns(&products, &batches, &ReconcileOptions::default()).unwrap();
/// assert_eq!(r.products[0].original_quantity, Quantity::from_major(10));
/// assert_eq!(r.products[0].returned_quantity, Quantity::from_major(3));
/// assert_eq!(r.products[0].pending_quantity, Quantity::from_major(7));
/// ```
pub fn reconcile_returns(
    products: &[ProductLine],
    batches: &[GoodsReturnBatch],
    options: &ReconcileOptions,
) -> CoreResult<ReturnsReconciliation> {
    validate_product_lines(products)?;
    for batch in batches {
        validate_return_batch(batch)?;
    }

    let mut returned = vec![Quantity::ZERO; products.len()];
    let mut warnings = Vec::new();
    let mut batch_valuations = Vec::with_capacity(batches.len());

    for batch in batches {
        let mut lines = Vec::with_capacity(batch.lines.len());

        for line in &batch.lines {
            let found = find_product(products, &batch.id, line, options.join)?;
            if let Some(candidates) = found.ambiguous {
                warnings.push(ReconcileWarning::AmbiguousProductName {
                    batch_id: batch.id.clone(),
                    product_name: line.product_name.clone(),
                    candidates,
                });
            }

            let product = &products[found.index];
            returned[found.index] += line.quantity;
            lines.push(ReturnLineValuation {
                product_index: found.index,
                product_name: product.name.clone(),
                quantity: line.quantity,
                matched_by: found.key,
                valuation: product.valuation_at(line.quantity),
            });
        }

        let total = lines.iter().map(|l| l.valuation.total).sum();
        batch_valuations.push(BatchValuation {
            batch_id: batch.id.clone(),
            lines,
            total,
        });
    }

    let mut reconciled = Vec::with_capacity(products.len());
    for (index, (product, returned_quantity)) in products.iter().zip(returned).enumerate() {
        let stored = product.quantity;
        let (original_quantity, pending_quantity) = match options.basis {
            QuantityBasis::NetOfReturns => (stored + returned_quantity, stored),
            QuantityBasis::Gross => (stored, stored - returned_quantity),
        };

        if pending_quantity.is_negative() {
            warnings.push(ReconcileWarning::OverReturn {
                product_index: index,
                product_name: product.name.clone(),
                original_quantity,
                returned_quantity,
                pending_quantity,
            });
        }

        reconciled.push(ProductReconciliation {
            index,
            product_id: product.id.clone(),
            name: product.name.clone(),
            original_quantity,
            returned_quantity,
            pending_quantity,
            original_valuation: product.valuation_at(original_quantity),
            returned_valuation: product.valuation_at(returned_quantity),
            pending_valuation: product.valuation_at(pending_quantity),
        });
    }

    let total_return_value = batch_valuations.iter().map(|b| b.total).sum();

    Ok(ReturnsReconciliation {
        products: reconciled,
        batches: batch_valuations,
        total_return_value,
        warnings,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
