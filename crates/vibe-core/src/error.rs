//! # Error Types
//!
//! Domain-specific error types for vibe-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vibe-core errors (this file)                                          │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── StoreError       - Port-level storage outcomes                    │
//! │  └── CheckoutError    - What the checkout caller sees                  │
//! │                                                                         │
//! │  vibe-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: sqlx::Error → DbError → StoreError → CheckoutError → Caller     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ingredient id, needed vs available)
//! 3. Errors are enum variants, never String
//! 4. Each checkout error variant maps to an actionable operator message

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed id, rate outside [0, 1]).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Store Error
// =============================================================================

/// Storage-port outcomes reported by Catalog, StockLedger, PolicyProvider
/// and ReceiptSink implementations.
///
/// The checkout coordinator is the only consumer: it retries
/// `VersionConflict`, fails fast on `OutOfStock`, and translates the rest
/// into [`CheckoutError`] variants. No other layer interprets these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Entity not found in the backing store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A conditional decrement found less stock than required, with the
    /// version still matching. A genuine shortage, not a race.
    #[error("out of stock for {ingredient_id}: needed {needed}, available {available}")]
    OutOfStock {
        ingredient_id: String,
        needed: Decimal,
        available: Decimal,
    },

    /// Another writer committed to this ingredient between the caller's
    /// read and write. The whole batch was rolled back.
    #[error("version conflict on {0}")]
    VersionConflict(String),

    /// The backing store is unreachable or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Failures surfaced by the checkout coordinator.
///
/// Every variant aborts the whole checkout: stock is either decremented in
/// full or not at all, and no receipt is persisted on any failure path.
/// The cart is never mutated, so the operator can adjust and resubmit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutError {
    /// Caller error: the cart had no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line references a product missing from the catalog.
    #[error("Product not found: {0}")]
    UnknownProduct(String),

    /// A recipe references an ingredient the ledger doesn't know.
    /// Data-integrity failure: recipes are validated at authoring time,
    /// so this means catalog and ledger have diverged.
    #[error("Ingredient not found: {0}")]
    IngredientNotFound(String),

    /// Insufficient stock, detected at pre-check or lost at the commit
    /// race. Never retried: the operator must re-enter with fresh intent.
    ///
    /// ## User Workflow
    /// ```text
    /// Charge (needs 4 patties)
    ///      │
    ///      ▼
    /// Ledger: available=3
    ///      │
    ///      ▼
    /// OutOfStock { ingredient_id: "ing_patty", needed: 4, available: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Beef Patty left"
    /// ```
    #[error("Out of stock for {ingredient_id}: needed {needed}, available {available}")]
    OutOfStock {
        ingredient_id: String,
        needed: Decimal,
        available: Decimal,
    },

    /// Version conflicts persisted through every bounded retry. The
    /// checkout wrote nothing; the caller may simply resubmit.
    #[error("Checkout contention not resolved after {attempts} attempts")]
    ConflictExhausted { attempts: u32 },

    /// The stock ledger (or another backing store) is unreachable.
    /// Transient: the caller may resubmit.
    #[error("Stock ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CheckoutError.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_out_of_stock_message() {
        let err = CheckoutError::OutOfStock {
            ingredient_id: "ing_patty".to_string(),
            needed: dec!(4),
            available: dec!(3),
        };
        assert_eq!(
            err.to_string(),
            "Out of stock for ing_patty: needed 4, available 3"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_checkout_error() {
        let validation_err = ValidationError::Required {
            field: "productId".to_string(),
        };
        let checkout_err: CheckoutError = validation_err.into();
        assert!(matches!(checkout_err, CheckoutError::Validation(_)));
    }

    #[test]
    fn test_store_error_not_found_helper() {
        let err = StoreError::not_found("Ingredient", "ing_bun");
        assert_eq!(err.to_string(), "Ingredient not found: ing_bun");
    }
}
