//! # vibe-core: Pure Business Logic for Vibe POS
//!
//! This crate is the **heart** of Vibe POS. It contains the checkout math
//! and the inventory-consistency contracts as pure code with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vibe POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Terminal / Caller                            │   │
//! │  │        build cart ──► checkout(cart) ──► receipt                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                vibe-checkout (Coordinator)                      │   │
//! │  │    resolve ──► aggregate ──► read ──► decrement ──► price       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vibe-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  demand   │  │  pricing  │  │   │
//! │  │   │ Ingredient│  │   Money   │  │ aggregate │  │ breakdown │  │   │
//! │  │   │  Receipt  │  │  Decimal  │  │  demand   │  │  VAT math │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vibe-db (Database Layer)                     │   │
//! │  │          SQLite ledger, catalog, receipts, settings             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Ingredient, Product, Cart, Receipt, etc.)
//! - [`money`] - Money type backed by exact decimal arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`demand`] - Per-ingredient demand aggregation over recipes
//! - [`pricing`] - VAT-inclusive price breakdown
//! - [`ports`] - Capability traits implemented by storage crates
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Exact Decimals**: All money and stock values are `rust_decimal::Decimal`;
//!    rounding happens once, at the receipt boundary
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod demand;
pub mod error;
pub mod money;
pub mod ports;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vibe_core::Money` instead of
// `use vibe_core::money::Money`

pub use error::{CheckoutError, StoreError, ValidationError};
pub use money::Money;
pub use ports::{Catalog, PolicyProvider, ReceiptSink, StockLedger};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum unique lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single product on one cart line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
/// Configurable per-store in future versions.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Bounded attempts for the optimistic-concurrency checkout loop.
///
/// A version conflict means another terminal committed between our read
/// and our write; the coordinator re-reads and re-validates up to this
/// many times before giving up with `ConflictExhausted`.
pub const MAX_CHECKOUT_ATTEMPTS: u32 = 3;
