//! # vibe-db: Database Layer for Vibe POS
//!
//! This crate provides database access for the Vibe POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vibe POS Data Flow                               │
//! │                                                                         │
//! │  CheckoutEngine (vibe-checkout)                                        │
//! │       │  via the vibe-core ports                                       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vibe-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │(ingredient.rs)│    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Ingredient    │    │ 001_init.sql │  │   │
//! │  │   │ WAL mode      │    │ Product       │    │              │  │   │
//! │  │   │ Busy timeout  │    │ Receipt       │    │              │  │   │
//! │  │   └───────────────┘    │ Settings      │    └──────────────┘  │   │
//! │  │                        └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (ingredient, product, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vibe_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/vibe.db")).await?;
//!
//! // Repositories double as the vibe-core ports:
//! let engine = vibe_checkout::CheckoutEngine::new(
//!     std::sync::Arc::new(db.products()),
//!     std::sync::Arc::new(db.ingredients()),
//!     std::sync::Arc::new(db.settings()),
//!     std::sync::Arc::new(db.receipts()),
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::ingredient::IngredientRepository;
pub use repository::product::ProductRepository;
pub use repository::receipt::ReceiptRepository;
pub use repository::settings::SettingsRepository;
