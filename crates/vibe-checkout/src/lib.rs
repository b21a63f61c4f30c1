//! # vibe-checkout: Checkout Coordinator for Vibe POS
//!
//! Orchestrates the checkout flow: cart validation, demand aggregation,
//! the optimistic stock reservation loop, pricing, and receipt persistence.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CheckoutEngine::checkout                          │
//! │                                                                         │
//! │  1. Reject empty carts                                                 │
//! │  2. Snapshot tax policy                                                │
//! │  3. Resolve products from the Catalog                                  │
//! │  4. Aggregate per-ingredient demand                                    │
//! │  5. Read stock + versions from the Ledger                              │
//! │  6. Pre-check quantities (fail fast, nothing written)                  │
//! │  7. Atomic conditional batch decrement                                 │
//! │       └── VersionConflict? → back to 5, bounded attempts               │
//! │  8. Price the cart, build the receipt, persist it                      │
//! │                                                                         │
//! │  Only step 7 mutates shared state. No receipt exists unless it ran.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - The coordinator itself
//! - [`memory`] - In-memory implementations of every port (tests and
//!   embedders without a database)

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod memory;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::CheckoutEngine;
pub use memory::{MemoryCatalog, MemoryPolicy, MemoryReceiptSink, MemoryStockLedger};
