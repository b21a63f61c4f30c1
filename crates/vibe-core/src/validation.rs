//! # Validation Module
//!
//! Input validation utilities for Vibe POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (terminal UI, import tooling)                         │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::RecipeLine;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity id (ingredient, product).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use vibe_core::validation::validate_entity_id;
///
/// assert!(validate_entity_id("ing_patty").is_ok());
/// assert!(validate_entity_id("").is_err());
/// assert!(validate_entity_id("has space").is_err());
/// ```
pub fn validate_entity_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: 64,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (ingredient, product, store).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a monetary amount used as a price or cost.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
pub fn validate_price(amount: Decimal) -> ValidationResult<()> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax or service-charge rate.
///
/// ## Rules
/// - Expressed as a fraction: 0.12 means 12%
/// - Must be within [0, 1]
pub fn validate_rate(field: &str, rate: Decimal) -> ValidationResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a fraction between 0 and 1".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock quantity (current stock, threshold, restock delta).
///
/// ## Rules
/// - Must be non-negative
pub fn validate_stock_quantity(field: &str, qty: Decimal) -> ValidationResult<()> {
    if qty < Decimal::ZERO {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Recipe Validators
// =============================================================================

/// Validates a product recipe at authoring time.
///
/// ## Rules
/// - Every requirement quantity must be > 0
/// - No ingredient may appear twice
/// - Every referenced ingredient must be in `known_ingredient_ids`
///
/// Checkout relies on this: the demand aggregator assumes recipes are
/// well-formed and only the ledger re-checks ingredient existence.
pub fn validate_recipe<'a, I>(recipe: &[RecipeLine], known_ingredient_ids: I) -> ValidationResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let known: std::collections::HashSet<&str> = known_ingredient_ids.into_iter().collect();
    let mut seen = std::collections::HashSet::new();

    for line in recipe {
        validate_entity_id(&line.ingredient_id)?;

        if line.quantity_required <= Decimal::ZERO {
            return Err(ValidationError::MustBePositive {
                field: format!("recipe quantity for {}", line.ingredient_id),
            });
        }

        if !seen.insert(line.ingredient_id.as_str()) {
            return Err(ValidationError::InvalidFormat {
                field: "recipe".to_string(),
                reason: format!("ingredient {} appears twice", line.ingredient_id),
            });
        }

        if !known.contains(line.ingredient_id.as_str()) {
            return Err(ValidationError::InvalidFormat {
                field: "recipe".to_string(),
                reason: format!("unknown ingredient {}", line.ingredient_id),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_entity_id() {
        assert!(validate_entity_id("ing_patty").is_ok());
        assert!(validate_entity_id("prod-classic-burger").is_ok());

        assert!(validate_entity_id("").is_err());
        assert!(validate_entity_id("   ").is_err());
        assert!(validate_entity_id("has space").is_err());
        assert!(validate_entity_id(&"a".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Classic Cheeseburger").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(dec!(150.00)).is_ok());
        assert!(validate_price(dec!(0)).is_ok());
        assert!(validate_price(dec!(-1)).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate("vatRate", dec!(0)).is_ok());
        assert!(validate_rate("vatRate", dec!(0.12)).is_ok());
        assert!(validate_rate("vatRate", dec!(1)).is_ok());
        assert!(validate_rate("vatRate", dec!(1.01)).is_err());
        assert!(validate_rate("vatRate", dec!(-0.1)).is_err());
    }

    #[test]
    fn test_validate_recipe() {
        let known = ["ing_bun", "ing_patty"];
        let good = vec![
            RecipeLine {
                ingredient_id: "ing_bun".to_string(),
                quantity_required: dec!(1),
            },
            RecipeLine {
                ingredient_id: "ing_patty".to_string(),
                quantity_required: dec!(2),
            },
        ];
        assert!(validate_recipe(&good, known).is_ok());

        let zero_qty = vec![RecipeLine {
            ingredient_id: "ing_bun".to_string(),
            quantity_required: dec!(0),
        }];
        assert!(validate_recipe(&zero_qty, known).is_err());

        let duplicate = vec![
            RecipeLine {
                ingredient_id: "ing_bun".to_string(),
                quantity_required: dec!(1),
            },
            RecipeLine {
                ingredient_id: "ing_bun".to_string(),
                quantity_required: dec!(1),
            },
        ];
        assert!(validate_recipe(&duplicate, known).is_err());

        let unknown = vec![RecipeLine {
            ingredient_id: "ing_cheese".to_string(),
            quantity_required: dec!(1),
        }];
        assert!(validate_recipe(&unknown, known).is_err());
    }
}
