//! # In-Memory Port Implementations
//!
//! Thread-safe in-memory stores implementing every vibe-core port. Used by
//! the test suites and by embedders that want a working engine without a
//! database.
//!
//! ## Atomicity Realization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MemoryStockLedger::apply_decrements                                    │
//! │                                                                         │
//! │  take write guard ──► validate EVERY entry ──► apply EVERY entry       │
//! │                            │                                            │
//! │                            └── any miss? return error, apply NOTHING   │
//! │                                                                         │
//! │  One guard covers the whole batch, so no reader or writer can ever     │
//! │  observe a partially applied checkout.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use vibe_core::error::StoreError;
use vibe_core::types::{
    DecrementBatch, Ingredient, Product, Receipt, StockSnapshot, TaxPolicy,
};
use vibe_core::{Catalog, PolicyProvider, ReceiptSink, StockLedger};

// =============================================================================
// Memory Catalog
// =============================================================================

/// In-memory catalog of products and ingredient definitions.
#[derive(Default, Clone)]
pub struct MemoryCatalog {
    products: Arc<RwLock<HashMap<String, Product>>>,
    ingredients: Arc<RwLock<HashMap<String, Ingredient>>>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-loaded with products.
    pub fn with_products(products: Vec<Product>) -> Self {
        let catalog = Self::new();
        {
            let mut guard = catalog
                .products
                .try_write()
                .expect("fresh catalog lock is uncontended");
            for product in products {
                guard.insert(product.id.clone(), product);
            }
        }
        catalog
    }

    /// Adds or replaces a product.
    pub async fn insert_product(&self, product: Product) {
        self.products.write().await.insert(product.id.clone(), product);
    }

    /// Adds or replaces an ingredient definition.
    pub async fn insert_ingredient(&self, ingredient: Ingredient) {
        self.ingredients
            .write()
            .await
            .insert(ingredient.id.clone(), ingredient);
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn ingredient(&self, id: &str) -> Result<Option<Ingredient>, StoreError> {
        Ok(self.ingredients.read().await.get(id).cloned())
    }
}

// =============================================================================
// Memory Stock Ledger
// =============================================================================

/// One ingredient's ledger entry.
#[derive(Debug, Clone, Copy)]
struct StockRecord {
    stock: Decimal,
    version: i64,
}

/// In-memory stock ledger with per-ingredient versions.
///
/// The single `RwLock` over the whole map is what makes the batch
/// decrement an atomic multi-key conditional write: validation and
/// application happen under one uninterrupted write guard.
#[derive(Default, Clone)]
pub struct MemoryStockLedger {
    records: Arc<RwLock<HashMap<String, StockRecord>>>,
}

impl MemoryStockLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger pre-loaded with stock levels (version 0 each).
    pub fn with_stock(stock: Vec<(&str, Decimal)>) -> Self {
        let ledger = Self::new();
        {
            let mut guard = ledger
                .records
                .try_write()
                .expect("fresh ledger lock is uncontended");
            for (id, qty) in stock {
                guard.insert(id.to_string(), StockRecord { stock: qty, version: 0 });
            }
        }
        ledger
    }

    /// Adds or replaces an ingredient's stock level.
    pub async fn set_stock(&self, id: &str, stock: Decimal) {
        let mut guard = self.records.write().await;
        let version = guard.get(id).map(|r| r.version + 1).unwrap_or(0);
        guard.insert(id.to_string(), StockRecord { stock, version });
    }

    /// Current stock for an ingredient, if it exists. Test helper.
    pub async fn stock_of(&self, id: &str) -> Option<Decimal> {
        self.records.read().await.get(id).map(|r| r.stock)
    }

    /// Current version for an ingredient, if it exists. Test helper.
    pub async fn version_of(&self, id: &str) -> Option<i64> {
        self.records.read().await.get(id).map(|r| r.version)
    }
}

#[async_trait]
impl StockLedger for MemoryStockLedger {
    async fn snapshot(&self, ids: &[String]) -> Result<HashMap<String, StockSnapshot>, StoreError> {
        let guard = self.records.read().await;

        let mut out = HashMap::with_capacity(ids.len());
        for id in ids {
            let record = guard
                .get(id)
                .ok_or_else(|| StoreError::not_found("Ingredient", id))?;
            out.insert(
                id.clone(),
                StockSnapshot {
                    stock: record.stock,
                    version: record.version,
                },
            );
        }
        Ok(out)
    }

    async fn apply_decrements(&self, batch: &DecrementBatch) -> Result<(), StoreError> {
        let mut guard = self.records.write().await;

        // Validate every entry before touching any. The first failing
        // condition is reported; per entry the version check comes first
        // so a stale read surfaces as a conflict, not a shortage.
        for (id, decrement) in batch {
            let record = guard
                .get(id)
                .ok_or_else(|| StoreError::not_found("Ingredient", id))?;

            if record.version != decrement.version_read {
                return Err(StoreError::VersionConflict(id.clone()));
            }

            if record.stock < decrement.required {
                return Err(StoreError::OutOfStock {
                    ingredient_id: id.clone(),
                    needed: decrement.required,
                    available: record.stock,
                });
            }
        }

        for (id, decrement) in batch {
            if let Some(record) = guard.get_mut(id) {
                record.stock -= decrement.required;
                record.version += 1;
            }
        }

        Ok(())
    }
}

// =============================================================================
// Memory Policy Provider
// =============================================================================

/// In-memory tax policy holder.
#[derive(Clone)]
pub struct MemoryPolicy {
    policy: Arc<RwLock<TaxPolicy>>,
}

impl MemoryPolicy {
    /// Creates a provider serving the given policy.
    pub fn new(policy: TaxPolicy) -> Self {
        MemoryPolicy {
            policy: Arc::new(RwLock::new(policy)),
        }
    }

    /// Replaces the policy. In-flight checkouts keep their snapshot; only
    /// subsequent checkouts see the change.
    pub async fn set(&self, policy: TaxPolicy) {
        *self.policy.write().await = policy;
    }
}

#[async_trait]
impl PolicyProvider for MemoryPolicy {
    async fn current_policy(&self) -> Result<TaxPolicy, StoreError> {
        Ok(self.policy.read().await.clone())
    }
}

// =============================================================================
// Memory Receipt Sink
// =============================================================================

/// In-memory receipt store, newest last.
#[derive(Default, Clone)]
pub struct MemoryReceiptSink {
    receipts: Arc<RwLock<Vec<Receipt>>>,
}

impl MemoryReceiptSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted receipts.
    pub async fn count(&self) -> usize {
        self.receipts.read().await.len()
    }

    /// All persisted receipts, in persistence order.
    pub async fn all(&self) -> Vec<Receipt> {
        self.receipts.read().await.clone()
    }
}

#[async_trait]
impl ReceiptSink for MemoryReceiptSink {
    async fn persist(&self, receipt: &Receipt) -> Result<(), StoreError> {
        self.receipts.write().await.push(receipt.clone());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
