//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE BINARY FLOATING POINT PROBLEM                                      │
//! │                                                                         │
//! │  In f64:                                                                │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  VAT-inclusive pricing needs division:                                  │
//! │    vatable = 1000.00 / 1.12 = 892.857142857...                          │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    The quotient is carried at full precision through the whole          │
//! │    breakdown and settles to 892.86 exactly once, on the receipt.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vibe_core::money::Money;
//! use rust_decimal_macros::dec;
//!
//! let price = Money::new(dec!(150.00));
//!
//! // Arithmetic operations
//! let doubled = price * 2;                     // 300.00
//! let total = price + Money::new(dec!(90.00)); // 240.00
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the store currency.
///
/// ## Design Decisions
/// - **Decimal (exact)**: No binary float drift; division stays exact to
///   28 significant digits
/// - **Single field tuple struct**: Zero-cost abstraction over Decimal
/// - **Derives**: Full serde support for persisted documents
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.base_price ──► ReceiptLine.unit_price ──► ReceiptLine total    │
/// │                                                                         │
/// │  subtotal ──► vatable sales ──► VAT amount ──► service charge ──► total │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero money value.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a Money value from a decimal amount.
    ///
    /// ## Example
    /// ```rust
    /// use vibe_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// let price = Money::new(dec!(150.00));
    /// assert_eq!(price.amount(), dec!(150.00));
    /// ```
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the underlying decimal amount at full precision.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds to 2 decimal places using banker's rounding (round half to even).
    ///
    /// ## Banker's Rounding Explained
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  BANKER'S ROUNDING (Round Half to Even)                             │
    /// │                                                                     │
    /// │  Standard rounding always rounds 0.005 UP, causing systematic bias │
    /// │  Banker's rounding sends exact halves to the nearest EVEN cent:    │
    /// │    0.125 → 0.12,  0.135 → 0.14                                      │
    /// │                                                                     │
    /// │  Over many transactions this prevents systematic loss/gain.        │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## When To Call
    /// Exactly once, when a breakdown is sealed into a receipt. Interior
    /// aggregation never rounds, so long carts do not compound error.
    #[inline]
    #[must_use]
    pub fn rounded(&self) -> Money {
        Money(self.0.round_dp(2))
    }

    /// Multiplies money by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use vibe_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// let unit_price = Money::new(dec!(150.00));
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.amount(), dec!(450.00));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money with two decimal places.
///
/// ## Note
/// This is for receipts and debugging. Currency symbol and localization
/// belong to whatever renders the receipt, not to this type.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Round first (banker's), then let the precision specifier pad
        // whole amounts out to two places.
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

/// Scaling by a decimal rate (for service charge / VAT factors).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, rate: Decimal) -> Self {
        Money(self.0 * rate)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
