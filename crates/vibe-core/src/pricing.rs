//! # Pricing Engine
//!
//! Computes the tax-compliant price breakdown for a cart.
//!
//! ## VAT-Inclusive Math
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Menu prices already contain VAT. The breakdown DISCLOSES the tax       │
//! │  portion; it never adds it again.                                       │
//! │                                                                         │
//! │  subtotal       = Σ base_price × quantity                               │
//! │  vatable sales  = subtotal / (1 + vat rate)     (if tax enabled)        │
//! │  VAT amount     = vatable sales × vat rate      (if tax enabled)        │
//! │  service charge = subtotal × service rate                               │
//! │  grand total    = subtotal + service charge                             │
//! │                                                                         │
//! │  Example, ₱1,000.00 at 12% VAT / 10% service:                          │
//! │    vatable  892.86   VAT  107.14   service  100.00   total  1,100.00   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure and total: same cart and policy always produce the same breakdown,
//! and there are no failure modes once the cart has been resolved against
//! the catalog. Interior values are carried at full precision;
//! [`PriceBreakdown::sealed`] rounds once for the receipt.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::Money;
use crate::types::{Cart, Product, ReceiptLine, TaxPolicy};

// =============================================================================
// Price Breakdown
// =============================================================================

/// The five figures of a receipt's money section.
///
/// Produced unrounded by [`price_lines`]; call [`sealed`](Self::sealed)
/// when freezing the figures onto a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Sum of line totals. VAT-inclusive.
    pub subtotal: Money,

    /// Sales value excluding VAT.
    pub vatable_sales: Money,

    /// Disclosed VAT portion of the subtotal.
    pub vat_amount: Money,

    /// Service charge on top of the subtotal.
    pub service_charge: Money,

    /// What the customer pays.
    pub grand_total: Money,
}

impl PriceBreakdown {
    /// Rounds every figure to 2 decimal places (banker's rounding).
    ///
    /// ## When To Call
    /// Exactly once, when the breakdown is frozen onto a receipt. Rounding
    /// earlier would compound across lines; rounding later would let
    /// sub-cent noise reach the persisted record.
    #[must_use]
    pub fn sealed(&self) -> PriceBreakdown {
        PriceBreakdown {
            subtotal: self.subtotal.rounded(),
            vatable_sales: self.vatable_sales.rounded(),
            vat_amount: self.vat_amount.rounded(),
            service_charge: self.service_charge.rounded(),
            grand_total: self.grand_total.rounded(),
        }
    }
}

// =============================================================================
// Pricing Operations
// =============================================================================

/// Freezes cart lines into receipt lines against a catalog snapshot.
///
/// Names and unit prices are copied (snapshot pattern), so the receipt
/// stays correct even if the product is renamed or repriced later.
pub fn build_lines(cart: &Cart, products: &HashMap<String, Product>) -> CheckoutResult<Vec<ReceiptLine>> {
    cart.lines
        .iter()
        .map(|line| {
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| CheckoutError::UnknownProduct(line.product_id.clone()))?;

            Ok(ReceiptLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity: line.quantity,
                unit_price: product.base_price,
                line_total: product.base_price.multiply_quantity(line.quantity),
            })
        })
        .collect()
}

/// Computes the price breakdown for a set of receipt lines.
///
/// ## Notes
/// - The VAT amount is a disclosed share of the subtotal, never added to
///   the grand total
/// - The service charge applies whenever its rate is non-zero, whether or
///   not the VAT breakdown is enabled
/// - Nothing is rounded here; see [`PriceBreakdown::sealed`]
pub fn price_lines(lines: &[ReceiptLine], policy: &TaxPolicy) -> PriceBreakdown {
    let subtotal = lines
        .iter()
        .fold(Money::ZERO, |acc, line| acc + line.line_total);

    let (vatable_sales, vat_amount) = if policy.enable_tax {
        let vatable = Money::new(subtotal.amount() / (Decimal::ONE + policy.vat_rate));
        let vat = vatable * policy.vat_rate;
        (vatable, vat)
    } else {
        (subtotal, Money::ZERO)
    };

    let service_charge = subtotal * policy.service_charge_rate;
    let grand_total = subtotal + service_charge;

    PriceBreakdown {
        subtotal,
        vatable_sales,
        vat_amount,
        service_charge,
        grand_total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecipeLine;
    use rust_decimal_macros::dec;

    fn ph_policy() -> TaxPolicy {
        TaxPolicy {
            enable_tax: true,
            vat_rate: dec!(0.12),
            service_charge_rate: dec!(0.10),
            is_vat_inclusive: true,
        }
    }

    fn line(name: &str, unit_price: Decimal, quantity: i64) -> ReceiptLine {
        ReceiptLine {
            product_id: format!("prod_{}", name),
            name: name.to_string(),
            quantity,
            unit_price: Money::new(unit_price),
            line_total: Money::new(unit_price).multiply_quantity(quantity),
        }
    }

    #[test]
    fn test_formula_exactness_1000_peso_order() {
        // The canonical compliance example: ₱1,000.00 at 12% / 10%
        let lines = vec![line("combo", dec!(500.00), 2)];
        let sealed = price_lines(&lines, &ph_policy()).sealed();

        assert_eq!(sealed.subtotal.amount(), dec!(1000.00));
        assert_eq!(sealed.vatable_sales.amount(), dec!(892.86));
        assert_eq!(sealed.vat_amount.amount(), dec!(107.14));
        assert_eq!(sealed.service_charge.amount(), dec!(100.00));
        assert_eq!(sealed.grand_total.amount(), dec!(1100.00));
    }

    #[test]
    fn test_vat_is_disclosed_not_added() {
        let lines = vec![line("burger", dec!(150.00), 1)];
        let breakdown = price_lines(&lines, &ph_policy());

        // grand total depends on subtotal and service charge only
        assert_eq!(
            breakdown.grand_total.amount(),
            breakdown.subtotal.amount() + breakdown.service_charge.amount()
        );
    }

    #[test]
    fn test_tax_disabled() {
        let policy = TaxPolicy {
            enable_tax: false,
            ..ph_policy()
        };
        let lines = vec![line("burger", dec!(150.00), 2)];
        let breakdown = price_lines(&lines, &policy);

        assert_eq!(breakdown.subtotal.amount(), dec!(300.00));
        assert_eq!(breakdown.vatable_sales.amount(), dec!(300.00));
        assert_eq!(breakdown.vat_amount, Money::ZERO);
        assert_eq!(breakdown.service_charge.amount(), dec!(30.00));
        assert_eq!(breakdown.grand_total.amount(), dec!(330.00));
    }

    #[test]
    fn test_service_charge_independent_of_tax_toggle() {
        let policy = TaxPolicy {
            enable_tax: false,
            service_charge_rate: dec!(0.10),
            ..ph_policy()
        };
        let lines = vec![line("burger", dec!(100.00), 1)];
        let breakdown = price_lines(&lines, &policy);
        assert_eq!(breakdown.service_charge.amount(), dec!(10.00));
    }

    #[test]
    fn test_zero_service_rate_disables_charge() {
        let policy = TaxPolicy {
            service_charge_rate: dec!(0),
            ..ph_policy()
        };
        let lines = vec![line("burger", dec!(150.00), 1)];
        let breakdown = price_lines(&lines, &policy);

        assert_eq!(breakdown.service_charge, Money::ZERO);
        assert_eq!(breakdown.grand_total, breakdown.subtotal);
    }

    #[test]
    fn test_no_intermediate_rounding_across_lines() {
        // 3 × ₱33.33 plus 1 × ₱0.01: interior values keep full precision,
        // so the sealed breakdown equals the single-line equivalent.
        let many = vec![line("a", dec!(33.33), 3), line("b", dec!(0.01), 1)];
        let one = vec![line("c", dec!(100.00), 1)];

        let sealed_many = price_lines(&many, &ph_policy()).sealed();
        let sealed_one = price_lines(&one, &ph_policy()).sealed();

        assert_eq!(sealed_many.subtotal, sealed_one.subtotal);
        assert_eq!(sealed_many.vatable_sales, sealed_one.vatable_sales);
        assert_eq!(sealed_many.vat_amount, sealed_one.vat_amount);
    }

    #[test]
    fn test_pricing_is_deterministic() {
        let lines = vec![line("burger", dec!(150.00), 2), line("double", dec!(240.00), 1)];
        let policy = ph_policy();

        assert_eq!(price_lines(&lines, &policy), price_lines(&lines, &policy));
    }

    #[test]
    fn test_empty_lines_price_to_zero() {
        let breakdown = price_lines(&[], &ph_policy());
        assert_eq!(breakdown.subtotal, Money::ZERO);
        assert_eq!(breakdown.grand_total, Money::ZERO);
    }

    #[test]
    fn test_build_lines_freezes_product_data() {
        let product = Product {
            id: "prod_classic_burger".to_string(),
            name: "Classic Cheeseburger".to_string(),
            category: "Mains".to_string(),
            base_price: Money::new(dec!(150.00)),
            recipe: vec![RecipeLine {
                ingredient_id: "ing_bun".to_string(),
                quantity_required: dec!(1),
            }],
        };
        let products: HashMap<String, Product> =
            [(product.id.clone(), product)].into_iter().collect();

        let mut cart = Cart::new();
        cart.add("prod_classic_burger", 2).unwrap();

        let lines = build_lines(&cart, &products).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Classic Cheeseburger");
        assert_eq!(lines[0].unit_price.amount(), dec!(150.00));
        assert_eq!(lines[0].line_total.amount(), dec!(300.00));
    }

    #[test]
    fn test_build_lines_unknown_product() {
        let products = HashMap::new();
        let mut cart = Cart::new();
        cart.add("prod_ghost", 1).unwrap();

        let err = build_lines(&cart, &products).unwrap_err();
        assert_eq!(err, CheckoutError::UnknownProduct("prod_ghost".to_string()));
    }
}
