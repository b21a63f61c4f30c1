//! # Domain Types
//!
//! Core domain types used throughout Vibe POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Ingredient    │   │    Product      │   │    Receipt      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  current_stock  │◄──│  recipe[]       │   │  lines[]        │       │
//! │  │  version        │   │  base_price     │   │  vat breakdown  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Cart        │   │   TaxPolicy     │   │ StockSnapshot   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  lines[]        │   │  vat_rate       │   │  stock          │       │
//! │  │  (unique ids)   │   │  service charge │   │  version        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Persisted documents use camelCase field names, so every type carries
//! `#[serde(rename_all = "camelCase")]`. The database layer round-trips
//! these documents; renaming a field is a schema migration, not a refactor.
//!
//! ## Optimistic Concurrency
//! Only `Ingredient` carries a `version`. Products and policy are read-only
//! snapshots for the duration of a checkout; ingredient stock is the single
//! shared mutable resource and every committed write bumps its version.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Stock Status
// =============================================================================

/// Traffic-light classification of an ingredient's stock level.
///
/// Informational only: checkout never consults it. Inventory screens and
/// the dashboard low-stock counter derive alerts from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Nothing left on the shelf.
    Out,
    /// At or below the reorder threshold.
    Low,
    /// Comfortably stocked.
    Good,
}

// =============================================================================
// Ingredient
// =============================================================================

/// A raw stock item consumed by product recipes.
///
/// ## Invariants
/// - `current_stock >= 0` at all times, including under concurrent
///   checkouts. The stock ledger is the only writer and enforces this.
/// - `version` changes on every committed write; a reader that saw
///   version N can detect any interleaved writer by comparing versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Unique identifier (e.g. "ing_patty").
    pub id: String,

    /// Display name shown on inventory screens.
    pub name: String,

    /// Display unit, e.g. "pcs", "grams", "slice".
    pub unit: String,

    /// Current stock on hand. Never negative.
    pub current_stock: Decimal,

    /// Reorder alert threshold. Informational only.
    pub low_stock_threshold: Decimal,

    /// Unit cost, for inventory valuation. Informational only.
    pub cost: Money,

    /// Optimistic-lock marker, bumped on every committed stock write.
    pub version: i64,

    /// When the ingredient was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// Classifies the stock level for inventory alerts.
    ///
    /// ## Rules
    /// - zero (or below, which the ledger never allows) → `Out`
    /// - at or under the threshold → `Low`
    /// - otherwise → `Good`
    pub fn stock_status(&self) -> StockStatus {
        if self.current_stock <= Decimal::ZERO {
            StockStatus::Out
        } else if self.current_stock <= self.low_stock_threshold {
            StockStatus::Low
        } else {
            StockStatus::Good
        }
    }

    /// Checks whether the ingredient is at or below its alert threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.low_stock_threshold
    }
}

// =============================================================================
// Product & Recipe
// =============================================================================

/// One ingredient requirement inside a product's recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    /// Ingredient consumed. Must exist in the catalog; checked when the
    /// product is authored, not at checkout.
    pub ingredient_id: String,

    /// Quantity consumed per unit sold. Always > 0.
    pub quantity_required: Decimal,
}

/// A menu item available for sale.
///
/// Products are immutable for the duration of a checkout: the coordinator
/// resolves them once and prices from that snapshot. Only ingredient stock
/// is versioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (e.g. "prod_classic_burger").
    pub id: String,

    /// Display name shown to cashier and on the receipt.
    pub name: String,

    /// Menu category, e.g. "Mains".
    pub category: String,

    /// Menu price. VAT-inclusive when the tax policy says so.
    pub base_price: Money,

    /// Ingredients consumed when one unit is sold. May be empty:
    /// stock-free items (services, open-priced extras) are legal and
    /// never touch the ledger.
    pub recipe: Vec<RecipeLine>,
}

impl Product {
    /// Checks whether selling this product consumes no ingredients.
    #[inline]
    pub fn is_stock_free(&self) -> bool {
        self.recipe.is_empty()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product being purchased.
    pub product_id: String,

    /// Units purchased. Always a positive integer.
    pub quantity: i64,
}

/// The shopping cart submitted to checkout.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product again
///   increases the existing line's quantity)
/// - Quantity on every line is > 0
/// - Maximum lines: 100; maximum quantity per line: 999
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Ordered lines, unique by product id.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - If product already in cart: increases that line's quantity
    /// - If product not in cart: appends a new line
    pub fn add(&mut self, product_id: &str, quantity: i64) -> Result<(), ValidationError> {
        crate::validation::validate_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 1,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(ValidationError::OutOfRange {
                field: "cart lines".to_string(),
                min: 0,
                max: MAX_CART_LINES as i64,
            });
        }

        self.lines.push(CartLine {
            product_id: product_id.to_string(),
            quantity,
        });
        Ok(())
    }

    /// Sets the quantity of an existing line. Zero removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> Result<(), ValidationError> {
        if quantity == 0 {
            self.lines.retain(|l| l.product_id != product_id);
            return Ok(());
        }

        crate::validation::validate_quantity(quantity)?;

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(ValidationError::InvalidFormat {
                field: "productId".to_string(),
                reason: format!("product {} not in cart", product_id),
            }),
        }
    }

    /// Removes a line by product id.
    pub fn remove(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Checks if the cart has no lines.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of unique product lines.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Tax Policy & Store Settings
// =============================================================================

/// VAT and service-charge rules in effect for a checkout.
///
/// A checkout prices against the policy snapshot taken when it starts;
/// a policy change mid-checkout affects only subsequent checkouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxPolicy {
    /// Whether the VAT breakdown is disclosed at all.
    pub enable_tax: bool,

    /// VAT rate as a fraction, e.g. 0.12 for 12%.
    pub vat_rate: Decimal,

    /// Service charge rate as a fraction, e.g. 0.10 for 10%.
    /// A zero rate disables the charge.
    pub service_charge_rate: Decimal,

    /// Menu prices include VAT. Stored for the persisted document shape;
    /// only the inclusive breakdown is implemented.
    pub is_vat_inclusive: bool,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        TaxPolicy {
            enable_tax: false,
            vat_rate: Decimal::ZERO,
            service_charge_rate: Decimal::ZERO,
            is_vat_inclusive: true,
        }
    }
}

/// Store-wide configuration document.
///
/// Persisted as a single document (the original system keeps it under the
/// key `global_config`); the tax settings inside it are what the
/// PolicyProvider port hands to the checkout coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    /// Name printed on receipts.
    pub store_name: String,

    /// ISO currency code, e.g. "PHP". Display concern only.
    pub currency: String,

    /// The active tax policy.
    pub tax_settings: TaxPolicy,
}

// =============================================================================
// Stock Ledger Wire Types
// =============================================================================

/// A versioned read of one ingredient's stock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    /// Stock at the moment of the read.
    pub stock: Decimal,

    /// Version at the moment of the read. Pass back to
    /// `apply_decrements` so the ledger can detect interleaved writers.
    pub version: i64,
}

/// One conditional decrement inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decrement {
    /// Quantity to subtract from current stock.
    pub required: Decimal,

    /// The version the caller read. The write only commits if the
    /// ingredient still carries this version.
    pub version_read: i64,
}

/// An all-or-nothing batch of conditional decrements, keyed by ingredient
/// id. BTreeMap so the batch is applied and reported in a stable order.
pub type DecrementBatch = BTreeMap<String, Decrement>;

// =============================================================================
// Receipt
// =============================================================================

/// The lifecycle state of a persisted sale record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Stock was decremented and the sale is final.
    Completed,
    /// Recorded for a declined attempt. The checkout coordinator never
    /// persists these; embedders that audit failures may.
    Failed,
}

/// A line item on a receipt.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    /// Product sold.
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub name: String,

    /// Units sold.
    pub quantity: i64,

    /// Unit price at time of sale (frozen).
    pub unit_price: Money,

    /// unit_price × quantity.
    pub line_total: Money,
}

/// A completed sale with its tax-compliant price breakdown.
///
/// Created once per successful checkout; immutable thereafter. All money
/// figures are sealed to 2 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable receipt number (YYMMDD-HHMMSS-NNNN).
    pub receipt_number: String,

    /// What was sold, with frozen names and prices.
    pub lines: Vec<ReceiptLine>,

    /// Sum of line totals. VAT-inclusive.
    pub subtotal: Money,

    /// Sales value excluding VAT: subtotal / (1 + vat rate).
    pub vatable_sales: Money,

    /// Disclosed VAT portion of the subtotal. Not added to the total.
    pub vat_amount: Money,

    /// Service charge added on top of the subtotal.
    pub service_charge: Money,

    /// What the customer pays: subtotal + service charge.
    pub grand_total: Money,

    /// When the sale completed.
    pub timestamp: DateTime<Utc>,

    /// Lifecycle state.
    pub status: ReceiptStatus,
}

// =============================================================================
// Unit Tests
// =============================================================================
