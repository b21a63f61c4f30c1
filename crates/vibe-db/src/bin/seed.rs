//! # Seed Data Generator
//!
//! Populates the database with the sample burger-joint data set for
//! development.
//!
//! ## Usage
//! ```bash
//! cargo run -p vibe-db --bin seed
//!
//! # Specify database path
//! cargo run -p vibe-db --bin seed -- --db ./data/vibe.db
//! ```
//!
//! ## Generated Data
//! - 4 ingredients (buns, patties, cheese slices, lettuce)
//! - 2 products with recipes (Classic Cheeseburger, Double Decker)
//! - Store settings with PH tax defaults (12% VAT inclusive, 10% service)

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use tracing_subscriber::EnvFilter;

use vibe_core::money::Money;
use vibe_core::types::{Ingredient, Product, RecipeLine, StoreSettings, TaxPolicy};
use vibe_db::{Database, DbConfig};

fn ingredients() -> Vec<Ingredient> {
    let now = Utc::now();
    let ingredient = |id: &str, name: &str, unit: &str, stock: Decimal, threshold: Decimal, cost: Decimal| Ingredient {
        id: id.to_string(),
        name: name.to_string(),
        unit: unit.to_string(),
        current_stock: stock,
        low_stock_threshold: threshold,
        cost: Money::new(cost),
        version: 0,
        updated_at: now,
    };

    vec![
        ingredient("ing_bun", "Burger Buns", "pcs", dec!(50), dec!(10), dec!(5.00)),
        ingredient("ing_patty", "Beef Patty (100g)", "pcs", dec!(42), dec!(15), dec!(25.00)),
        ingredient("ing_cheese", "Cheddar Slice", "slice", dec!(100), dec!(20), dec!(3.50)),
        ingredient("ing_lettuce", "Iceberg Lettuce", "grams", dec!(500), dec!(100), dec!(0.50)),
    ]
}

fn products() -> Vec<Product> {
    let line = |ingredient_id: &str, quantity_required: Decimal| RecipeLine {
        ingredient_id: ingredient_id.to_string(),
        quantity_required,
    };

    vec![
        Product {
            id: "prod_classic_burger".to_string(),
            name: "Classic Cheeseburger".to_string(),
            category: "Mains".to_string(),
            base_price: Money::new(dec!(150.00)),
            recipe: vec![
                line("ing_bun", dec!(1)),
                line("ing_patty", dec!(1)),
                line("ing_cheese", dec!(1)),
                line("ing_lettuce", dec!(20)),
            ],
        },
        Product {
            id: "prod_double_burger".to_string(),
            name: "Double Decker".to_string(),
            category: "Mains".to_string(),
            base_price: Money::new(dec!(240.00)),
            recipe: vec![
                line("ing_bun", dec!(1)),
                line("ing_patty", dec!(2)),
                line("ing_cheese", dec!(2)),
                line("ing_lettuce", dec!(30)),
            ],
        },
    ]
}

fn settings() -> StoreSettings {
    StoreSettings {
        store_name: "Vibe Burger Joint".to_string(),
        currency: "PHP".to_string(),
        tax_settings: TaxPolicy {
            enable_tax: true,
            vat_rate: dec!(0.12),
            service_charge_rate: dec!(0.10),
            is_vat_inclusive: true,
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./vibe_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vibe POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vibe_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vibe POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Skip if already populated
    if !db.ingredients().list_all().await?.is_empty() {
        println!("⚠ Database already has ingredients");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let ingredient_set = ingredients();
    for ingredient in &ingredient_set {
        db.ingredients().insert(ingredient).await?;
    }
    println!("📦 Seeded {} ingredients", ingredient_set.len());

    let product_set = products();
    for product in &product_set {
        db.products().insert(product).await?;
    }
    println!("🍔 Seeded {} products", product_set.len());

    db.settings().upsert(&settings()).await?;
    println!("⚙️ Seeded settings");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
