//! # Checkout Engine
//!
//! The coordinator that turns a cart into a receipt while keeping the
//! stock ledger consistent under concurrent terminals.
//!
//! ## Concurrency Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Terminal A                         Terminal B                          │
//! │  ──────────                         ──────────                          │
//! │  read patty: stock=5, v1            read patty: stock=5, v1            │
//! │  pre-check 3 ≤ 5 ✓                  pre-check 3 ≤ 5 ✓                  │
//! │  decrement [patty:3 @ v1] ✓         decrement [patty:3 @ v1] ✗         │
//! │    stock=2, v2                        VersionConflict(patty)            │
//! │                                     re-read patty: stock=2, v2          │
//! │                                     pre-check 3 ≤ 2 ✗                  │
//! │                                     OutOfStock(patty, 3, 2)             │
//! │                                                                         │
//! │  Last-committer-wins is not enough: the loser must RE-VALIDATE, not    │
//! │  blindly overwrite. Stock never goes negative at any observed point.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A version conflict is retried with fresh reads up to
//! [`MAX_CHECKOUT_ATTEMPTS`] times over the same cart and demand; a
//! write-time stock shortage is never retried because it means the race
//! was lost for good and the operator has to re-enter with fresh intent.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use vibe_core::demand::{aggregate_demand, DemandMap};
use vibe_core::error::{CheckoutError, CheckoutResult, StoreError};
use vibe_core::pricing::{build_lines, price_lines};
use vibe_core::types::{Cart, Decrement, DecrementBatch, Product, Receipt, ReceiptStatus};
use vibe_core::{Catalog, PolicyProvider, ReceiptSink, StockLedger, MAX_CHECKOUT_ATTEMPTS};

// =============================================================================
// Checkout Engine
// =============================================================================

/// Coordinates one checkout at a time against shared stores.
///
/// The engine is cheap to clone and safe to share across terminals: every
/// dependency is an `Arc<dyn Port>` and all state lives behind the ports.
#[derive(Clone)]
pub struct CheckoutEngine {
    catalog: Arc<dyn Catalog>,
    ledger: Arc<dyn StockLedger>,
    policy: Arc<dyn PolicyProvider>,
    receipts: Arc<dyn ReceiptSink>,
}

impl CheckoutEngine {
    /// Creates a new engine over the given ports.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        ledger: Arc<dyn StockLedger>,
        policy: Arc<dyn PolicyProvider>,
        receipts: Arc<dyn ReceiptSink>,
    ) -> Self {
        CheckoutEngine {
            catalog,
            ledger,
            policy,
            receipts,
        }
    }

    /// Runs a full checkout for the given cart.
    ///
    /// ## Returns
    /// - `Ok(Receipt)` - stock decremented, receipt persisted
    /// - `Err(CheckoutError)` - nothing written anywhere; the cart is
    ///   untouched and may be adjusted and resubmitted
    pub async fn checkout(&self, cart: &Cart) -> CheckoutResult<Receipt> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        debug!(lines = cart.line_count(), quantity = cart.total_quantity(), "Starting checkout");

        // Policy snapshot: a settings change mid-checkout affects only
        // subsequent checkouts.
        let policy = self
            .policy
            .current_policy()
            .await
            .map_err(|e| CheckoutError::LedgerUnavailable(e.to_string()))?;

        let products = self.resolve_products(cart).await?;
        let demand = aggregate_demand(cart, &products)?;

        // A cart of only stock-free products never touches the ledger.
        if demand.is_empty() {
            debug!("Cart has no ingredient demand, skipping stock reservation");
        } else {
            self.reserve_stock(&demand).await?;
        }

        let lines = build_lines(cart, &products)?;
        let breakdown = price_lines(&lines, &policy).sealed();

        let receipt = Receipt {
            id: Uuid::new_v4().to_string(),
            receipt_number: generate_receipt_number(),
            lines,
            subtotal: breakdown.subtotal,
            vatable_sales: breakdown.vatable_sales,
            vat_amount: breakdown.vat_amount,
            service_charge: breakdown.service_charge,
            grand_total: breakdown.grand_total,
            timestamp: Utc::now(),
            status: ReceiptStatus::Completed,
        };

        self.receipts
            .persist(&receipt)
            .await
            .map_err(|e| CheckoutError::LedgerUnavailable(e.to_string()))?;

        info!(
            receipt = %receipt.receipt_number,
            grand_total = %receipt.grand_total,
            lines = receipt.lines.len(),
            "Checkout completed"
        );

        Ok(receipt)
    }

    /// Resolves every cart line's product into a per-checkout snapshot.
    async fn resolve_products(&self, cart: &Cart) -> CheckoutResult<HashMap<String, Product>> {
        let mut products = HashMap::with_capacity(cart.line_count());

        for line in &cart.lines {
            if products.contains_key(&line.product_id) {
                continue;
            }
            let product = self
                .catalog
                .product(&line.product_id)
                .await
                .map_err(|e| CheckoutError::LedgerUnavailable(e.to_string()))?
                .ok_or_else(|| CheckoutError::UnknownProduct(line.product_id.clone()))?;
            products.insert(product.id.clone(), product);
        }

        Ok(products)
    }

    /// The optimistic reservation loop: read, pre-check, conditionally
    /// decrement, retry on version conflict.
    ///
    /// The demand map is fixed across attempts; only the reads are fresh.
    async fn reserve_stock(&self, demand: &DemandMap) -> CheckoutResult<()> {
        let ids: Vec<String> = demand.keys().cloned().collect();

        for attempt in 1..=MAX_CHECKOUT_ATTEMPTS {
            let snapshot = self.ledger.snapshot(&ids).await.map_err(snapshot_error)?;

            // Fail fast before contending for the write: a shortage that is
            // already visible needs no ledger round trip to be final.
            let mut batch = DecrementBatch::new();
            for (ingredient_id, needed) in demand {
                let read = snapshot.get(ingredient_id).ok_or_else(|| {
                    CheckoutError::IngredientNotFound(ingredient_id.clone())
                })?;

                if *needed > read.stock {
                    return Err(CheckoutError::OutOfStock {
                        ingredient_id: ingredient_id.clone(),
                        needed: *needed,
                        available: read.stock,
                    });
                }

                batch.insert(
                    ingredient_id.clone(),
                    Decrement {
                        required: *needed,
                        version_read: read.version,
                    },
                );
            }

            match self.ledger.apply_decrements(&batch).await {
                Ok(()) => {
                    debug!(attempt, ingredients = batch.len(), "Stock reserved");
                    return Ok(());
                }
                // Another terminal committed between our read and write.
                // The batch rolled back in full; re-read and re-validate.
                Err(StoreError::VersionConflict(ingredient_id)) => {
                    warn!(attempt, ingredient = %ingredient_id, "Version conflict, retrying");
                    continue;
                }
                // The race was lost for good: the winner consumed the
                // stock. Retrying cannot help; surface the shortage.
                Err(StoreError::OutOfStock {
                    ingredient_id,
                    needed,
                    available,
                }) => {
                    return Err(CheckoutError::OutOfStock {
                        ingredient_id,
                        needed,
                        available,
                    });
                }
                Err(StoreError::NotFound { id, .. }) => {
                    return Err(CheckoutError::IngredientNotFound(id));
                }
                Err(StoreError::Unavailable(reason)) => {
                    return Err(CheckoutError::LedgerUnavailable(reason));
                }
            }
        }

        Err(CheckoutError::ConflictExhausted {
            attempts: MAX_CHECKOUT_ATTEMPTS,
        })
    }
}

/// Maps snapshot-phase store errors to checkout errors.
fn snapshot_error(err: StoreError) -> CheckoutError {
    match err {
        StoreError::NotFound { id, .. } => CheckoutError::IngredientNotFound(id),
        other => CheckoutError::LedgerUnavailable(other.to_string()),
    }
}

/// Generates a receipt number in format: YYMMDD-HHMMSS-NNNN
fn generate_receipt_number() -> String {
    let now = Utc::now();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let random: u16 = (nanos % 10000) as u16;
    format!("{}-{:04}", now.format("%y%m%d-%H%M%S"), random)
}

// =============================================================================
// Unit Tests
// =============================================================================
