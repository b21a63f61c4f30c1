//! # Port Traits
//!
//! Capability traits the checkout coordinator consumes. Storage crates
//! implement them; the coordinator takes them as explicit dependencies,
//! never as implicit singletons.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutEngine ──► Catalog         (read-only menu snapshot)           │
//! │                ──► StockLedger      (the ONLY shared mutable state)     │
//! │                ──► PolicyProvider   (tax policy snapshot)               │
//! │                ──► ReceiptSink      (persist completed sales)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::types::{DecrementBatch, Ingredient, Product, Receipt, StockSnapshot, TaxPolicy};

/// Read-only view of the menu and ingredient definitions.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetches a product with its recipe. `None` if the id is unknown.
    async fn product(&self, id: &str) -> Result<Option<Product>, StoreError>;

    /// Fetches an ingredient definition. `None` if the id is unknown.
    async fn ingredient(&self, id: &str) -> Result<Option<Ingredient>, StoreError>;
}

/// The authoritative current-stock value per ingredient.
///
/// ## Atomicity Contract
/// `apply_decrements` is the atomicity boundary of the whole system. An
/// implementation must apply the batch as a single atomic multi-key
/// conditional write: either every listed ingredient is decremented (and
/// its version bumped), or none is. Partial application must never be
/// observable, under any failure or interleaving. A mutex-guarded map and
/// a database transaction both satisfy this; N independent single-key
/// writes do not.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Reads `(current stock, version)` for each requested ingredient.
    ///
    /// Fails with [`StoreError::NotFound`] if any id is unknown. Readers
    /// never block writers.
    async fn snapshot(&self, ids: &[String]) -> Result<HashMap<String, StockSnapshot>, StoreError>;

    /// Conditionally decrements every ingredient in the batch.
    ///
    /// For each entry the ingredient must still carry `version_read` and
    /// at least `required` stock. On any miss the whole batch is rolled
    /// back and the first failing condition is reported:
    /// - [`StoreError::VersionConflict`] - another writer committed since
    ///   the read; the caller may re-read and re-validate
    /// - [`StoreError::OutOfStock`] - version matched but stock is short;
    ///   a genuine shortage, not worth retrying
    /// - [`StoreError::NotFound`] - the ingredient vanished from the store
    async fn apply_decrements(&self, batch: &DecrementBatch) -> Result<(), StoreError>;
}

/// Supplies the tax policy in effect right now.
#[async_trait]
pub trait PolicyProvider: Send + Sync {
    /// Returns the current policy. The coordinator calls this once per
    /// checkout and prices against that snapshot.
    async fn current_policy(&self) -> Result<TaxPolicy, StoreError>;
}

/// Accepts completed receipts for persistence.
#[async_trait]
pub trait ReceiptSink: Send + Sync {
    /// Persists a receipt. Called only after the stock write committed.
    async fn persist(&self, receipt: &Receipt) -> Result<(), StoreError>;
}
