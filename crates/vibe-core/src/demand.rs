//! # Demand Aggregation
//!
//! Converts a cart of recipe-backed lines into one consolidated
//! per-ingredient quantity requirement.
//!
//! ## How Aggregation Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart                          Recipes                Demand            │
//! │                                                                         │
//! │  2 × Classic Burger ──► [bun:1, patty:1]  ──►  bun:   2 + 1 = 3        │
//! │  1 × Double Decker  ──► [bun:1, patty:2]  ──►  patty: 2 + 2 = 4        │
//! │                                                                         │
//! │  One ledger decrement per ingredient, regardless of how many cart      │
//! │  lines consume it.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deterministic and side-effect free: the aggregator only reads the
//! already-resolved product snapshot and never touches the stock ledger.

use std::collections::BTreeMap;
use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::{CheckoutError, CheckoutResult};
use crate::types::{Cart, Product};

/// Total quantity required per ingredient for one checkout.
///
/// BTreeMap keyed by ingredient id: the coordinator reads, pre-checks and
/// decrements in this order, so ledger batches are stable across retries.
pub type DemandMap = BTreeMap<String, Decimal>;

/// Aggregates a cart into its per-ingredient demand.
///
/// ## Arguments
/// * `cart` - The cart being checked out
/// * `products` - Catalog snapshot for this checkout, keyed by product id
///
/// ## Behavior
/// - A cart line whose product is missing from the snapshot fails with
///   [`CheckoutError::UnknownProduct`]
/// - Each recipe requirement contributes `quantity_required × line.quantity`
/// - Requirements for the same ingredient sum across all lines
/// - Stock-free products contribute nothing; a cart of only stock-free
///   products yields an empty map and checkout proceeds without touching
///   the ledger
///
/// The returned map never contains zero entries: recipe quantities are
/// positive by authoring-time validation and line quantities are positive
/// by cart invariants.
pub fn aggregate_demand(cart: &Cart, products: &HashMap<String, Product>) -> CheckoutResult<DemandMap> {
    let mut demand = DemandMap::new();

    for line in &cart.lines {
        let product = products
            .get(&line.product_id)
            .ok_or_else(|| CheckoutError::UnknownProduct(line.product_id.clone()))?;

        let line_qty = Decimal::from(line.quantity);
        for requirement in &product.recipe {
            *demand
                .entry(requirement.ingredient_id.clone())
                .or_insert(Decimal::ZERO) += requirement.quantity_required * line_qty;
        }
    }

    Ok(demand)
}

// =============================================================================
// Unit Tests
// =============================================================================
