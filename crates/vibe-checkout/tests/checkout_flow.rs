//! End-to-end checkout behavior over the in-memory ports: conservation of
//! stock, all-or-nothing application, and no overselling under concurrent
//! terminals.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use vibe_checkout::{
    CheckoutEngine, MemoryCatalog, MemoryPolicy, MemoryReceiptSink, MemoryStockLedger,
};
use vibe_core::error::CheckoutError;
use vibe_core::money::Money;
use vibe_core::types::{Cart, Product, RecipeLine, TaxPolicy};

fn product(id: &str, name: &str, price: Decimal, recipe: Vec<(&str, Decimal)>) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: "Mains".to_string(),
        base_price: Money::new(price),
        recipe: recipe
            .into_iter()
            .map(|(ingredient_id, quantity_required)| RecipeLine {
                ingredient_id: ingredient_id.to_string(),
                quantity_required,
            })
            .collect(),
    }
}

fn ph_policy() -> TaxPolicy {
    TaxPolicy {
        enable_tax: true,
        vat_rate: dec!(0.12),
        service_charge_rate: dec!(0.10),
        is_vat_inclusive: true,
    }
}

/// The sample menu: a classic burger and a double decker sharing buns,
/// patties, cheese and lettuce.
fn sample_menu() -> Vec<Product> {
    vec![
        product(
            "prod_classic_burger",
            "Classic Cheeseburger",
            dec!(150.00),
            vec![
                ("ing_bun", dec!(1)),
                ("ing_patty", dec!(1)),
                ("ing_cheese", dec!(1)),
                ("ing_lettuce", dec!(20)),
            ],
        ),
        product(
            "prod_double_burger",
            "Double Decker",
            dec!(240.00),
            vec![
                ("ing_bun", dec!(1)),
                ("ing_patty", dec!(2)),
                ("ing_cheese", dec!(2)),
                ("ing_lettuce", dec!(30)),
            ],
        ),
    ]
}

fn sample_stock() -> Vec<(&'static str, Decimal)> {
    vec![
        ("ing_bun", dec!(50)),
        ("ing_patty", dec!(42)),
        ("ing_cheese", dec!(100)),
        ("ing_lettuce", dec!(500)),
    ]
}

fn build_engine(
    products: Vec<Product>,
    stock: Vec<(&str, Decimal)>,
) -> (CheckoutEngine, Arc<MemoryStockLedger>, Arc<MemoryReceiptSink>) {
    let ledger = Arc::new(MemoryStockLedger::with_stock(stock));
    let receipts = Arc::new(MemoryReceiptSink::new());
    let engine = CheckoutEngine::new(
        Arc::new(MemoryCatalog::with_products(products)),
        ledger.clone(),
        Arc::new(MemoryPolicy::new(ph_policy())),
        receipts.clone(),
    );
    (engine, ledger, receipts)
}

#[tokio::test]
async fn conservation_stock_drops_by_exactly_the_aggregate_demand() {
    let (engine, ledger, receipts) = build_engine(sample_menu(), sample_stock());

    // 2 × classic + 1 × double: bun 3, patty 4, cheese 4, lettuce 70
    let mut cart = Cart::new();
    cart.add("prod_classic_burger", 2).unwrap();
    cart.add("prod_double_burger", 1).unwrap();

    let receipt = engine.checkout(&cart).await.unwrap();

    assert_eq!(ledger.stock_of("ing_bun").await, Some(dec!(47)));
    assert_eq!(ledger.stock_of("ing_patty").await, Some(dec!(38)));
    assert_eq!(ledger.stock_of("ing_cheese").await, Some(dec!(96)));
    assert_eq!(ledger.stock_of("ing_lettuce").await, Some(dec!(430)));

    // Receipt math: subtotal 540.00 at 12% VAT / 10% service
    assert_eq!(receipt.subtotal.amount(), dec!(540.00));
    assert_eq!(receipt.vatable_sales.amount(), dec!(482.14));
    assert_eq!(receipt.vat_amount.amount(), dec!(57.86));
    assert_eq!(receipt.service_charge.amount(), dec!(54.00));
    assert_eq!(receipt.grand_total.amount(), dec!(594.00));

    let persisted = receipts.all().await;
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0], receipt);
}

#[tokio::test]
async fn atomicity_one_short_ingredient_blocks_every_decrement() {
    let mut stock = sample_stock();
    // Only 3 patties: the double decker demand (4) cannot be met.
    stock[1] = ("ing_patty", dec!(3));
    let (engine, ledger, receipts) = build_engine(sample_menu(), stock);

    let mut cart = Cart::new();
    cart.add("prod_double_burger", 2).unwrap();

    let err = engine.checkout(&cart).await.unwrap_err();
    assert_eq!(
        err,
        CheckoutError::OutOfStock {
            ingredient_id: "ing_patty".to_string(),
            needed: dec!(4),
            available: dec!(3),
        }
    );

    // Sufficient ingredients are untouched too.
    assert_eq!(ledger.stock_of("ing_bun").await, Some(dec!(50)));
    assert_eq!(ledger.stock_of("ing_patty").await, Some(dec!(3)));
    assert_eq!(ledger.stock_of("ing_cheese").await, Some(dec!(100)));
    assert_eq!(receipts.count().await, 0);
}

#[tokio::test]
async fn contention_two_checkouts_cannot_oversell_a_shared_ingredient() {
    // 5 patties, two carts needing 3 each: at most one may win.
    let (engine, ledger, receipts) = build_engine(
        vec![product(
            "prod_patty_melt",
            "Patty Melt",
            dec!(180.00),
            vec![("ing_patty", dec!(3))],
        )],
        vec![("ing_patty", dec!(5))],
    );

    let mut cart = Cart::new();
    cart.add("prod_patty_melt", 1).unwrap();

    let a = {
        let engine = engine.clone();
        let cart = cart.clone();
        tokio::spawn(async move { engine.checkout(&cart).await })
    };
    let b = {
        let engine = engine.clone();
        let cart = cart.clone();
        tokio::spawn(async move { engine.checkout(&cart).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();

    assert_eq!(successes, 1, "exactly one checkout may win the last patties");
    assert_eq!(ledger.stock_of("ing_patty").await, Some(dec!(2)));
    assert_eq!(receipts.count().await, 1);

    // The loser re-validated against fresh stock and reported the real
    // shortfall instead of burning its retries.
    let loser = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one checkout must lose");
    assert_eq!(
        *loser,
        CheckoutError::OutOfStock {
            ingredient_id: "ing_patty".to_string(),
            needed: dec!(3),
            available: dec!(2),
        }
    );
}

#[tokio::test]
async fn contention_many_terminals_never_drive_stock_negative() {
    // 8 terminals race for 5 burgers' worth of patties. Winners vary by
    // schedule; the invariant does not.
    let (engine, ledger, _) = build_engine(
        vec![product(
            "prod_classic_burger",
            "Classic Cheeseburger",
            dec!(150.00),
            vec![("ing_patty", dec!(1))],
        )],
        vec![("ing_patty", dec!(5))],
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let mut cart = Cart::new();
            cart.add("prod_classic_burger", 1).unwrap();
            engine.checkout(&cart).await
        }));
    }

    let mut successes = 0i64;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(CheckoutError::OutOfStock { .. }) | Err(CheckoutError::ConflictExhausted { .. }) => {}
            Err(other) => panic!("unexpected checkout failure: {other}"),
        }
    }

    let remaining = ledger.stock_of("ing_patty").await.unwrap();
    assert!(successes <= 5);
    assert_eq!(remaining, dec!(5) - Decimal::from(successes));
    assert!(remaining >= dec!(0));
}

#[tokio::test]
async fn failed_checkout_leaves_cart_reusable() {
    let mut stock = sample_stock();
    stock[1] = ("ing_patty", dec!(3));
    let (engine, _, _) = build_engine(sample_menu(), stock);

    let mut cart = Cart::new();
    cart.add("prod_double_burger", 2).unwrap();

    assert!(engine.checkout(&cart).await.is_err());

    // Operator drops one double decker and resubmits the same cart value.
    cart.update_quantity("prod_double_burger", 1).unwrap();
    let receipt = engine.checkout(&cart).await.unwrap();
    assert_eq!(receipt.subtotal.amount(), dec!(240.00));
}

#[tokio::test]
async fn policy_change_applies_to_subsequent_checkouts_only() {
    let ledger = Arc::new(MemoryStockLedger::with_stock(sample_stock()));
    let policy = Arc::new(MemoryPolicy::new(ph_policy()));
    let receipts = Arc::new(MemoryReceiptSink::new());
    let engine = CheckoutEngine::new(
        Arc::new(MemoryCatalog::with_products(sample_menu())),
        ledger,
        policy.clone(),
        receipts,
    );

    let mut cart = Cart::new();
    cart.add("prod_classic_burger", 1).unwrap();

    let taxed = engine.checkout(&cart).await.unwrap();
    assert_eq!(taxed.vat_amount.amount(), dec!(16.07));

    policy
        .set(TaxPolicy {
            enable_tax: false,
            vat_rate: dec!(0.12),
            service_charge_rate: dec!(0),
            is_vat_inclusive: true,
        })
        .await;

    let untaxed = engine.checkout(&cart).await.unwrap();
    assert_eq!(untaxed.vat_amount, Money::ZERO);
    assert_eq!(untaxed.grand_total.amount(), dec!(150.00));
}
