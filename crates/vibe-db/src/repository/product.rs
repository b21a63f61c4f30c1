//! # Product Repository
//!
//! Database operations for products and their recipes, and the Catalog
//! port implementation.
//!
//! ## Recipe Integrity
//! Recipes are validated when a product is authored: every referenced
//! ingredient must already exist, quantities must be positive, and no
//! ingredient may appear twice. Checkout trusts this and only the stock
//! ledger re-checks existence.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::ingredient::{parse_decimal, IngredientRepository};
use vibe_core::error::StoreError;
use vibe_core::money::Money;
use vibe_core::types::{Ingredient, Product, RecipeLine};
use vibe_core::Catalog;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// repo.insert(&product).await?;
/// let menu = repo.list_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product with its recipe.
    ///
    /// ## What This Does
    /// 1. Validates name, price, and the recipe against the known
    ///    ingredient ids
    /// 2. Inserts the product row and every recipe line in one
    ///    transaction, preserving recipe order via `position`
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Inserting product");

        vibe_core::validation::validate_entity_id(&product.id)?;
        vibe_core::validation::validate_name(&product.name)?;
        vibe_core::validation::validate_price(product.base_price.amount())?;

        let known_ids: Vec<String> = sqlx::query("SELECT id FROM ingredients")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<Result<_, _>>()?;
        vibe_core::validation::validate_recipe(
            &product.recipe,
            known_ids.iter().map(String::as_str),
        )?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, base_price)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.base_price.amount().to_string())
        .execute(&mut *tx)
        .await?;

        for (position, line) in product.recipe.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO recipe_lines (product_id, position, ingredient_id, quantity_required)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&product.id)
            .bind(position as i64)
            .bind(&line.ingredient_id)
            .bind(line.quantity_required.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets a product by its ID, recipe included.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, category, base_price
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let recipe = self.recipe_of(id).await?;
        let base_price: String = row.try_get("base_price")?;

        Ok(Some(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            base_price: Money::new(parse_decimal(&base_price, "base_price")?),
            recipe,
        }))
    }

    /// Lists every product, ordered by name (the menu view).
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query("SELECT id FROM products ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            if let Some(product) = self.get_by_id(&id).await? {
                products.push(product);
            }
        }
        Ok(products)
    }

    /// Loads a product's recipe lines in authored order.
    async fn recipe_of(&self, product_id: &str) -> DbResult<Vec<RecipeLine>> {
        let rows = sqlx::query(
            r#"
            SELECT ingredient_id, quantity_required
            FROM recipe_lines
            WHERE product_id = ?1
            ORDER BY position
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let quantity_required: String = row.try_get("quantity_required")?;
                Ok(RecipeLine {
                    ingredient_id: row.try_get("ingredient_id")?,
                    quantity_required: parse_decimal(&quantity_required, "quantity_required")?,
                })
            })
            .collect()
    }
}

// =============================================================================
// Catalog Port
// =============================================================================

#[async_trait]
impl Catalog for ProductRepository {
    async fn product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        self.get_by_id(id).await.map_err(Into::into)
    }

    async fn ingredient(&self, id: &str) -> Result<Option<Ingredient>, StoreError> {
        IngredientRepository::new(self.pool.clone())
            .get_by_id(id)
            .await
            .map_err(Into::into)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn db_with_ingredients(ids: &[&str]) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for id in ids {
            db.ingredients()
                .insert(&Ingredient {
                    id: id.to_string(),
                    name: format!("Ingredient {}", id),
                    unit: "pcs".to_string(),
                    current_stock: dec!(50),
                    low_stock_threshold: dec!(10),
                    cost: Money::new(dec!(5.00)),
                    version: 0,
                    updated_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        db
    }

    fn classic_burger() -> Product {
        Product {
            id: "prod_classic_burger".to_string(),
            name: "Classic Cheeseburger".to_string(),
            category: "Mains".to_string(),
            base_price: Money::new(dec!(150.00)),
            recipe: vec![
                RecipeLine {
                    ingredient_id: "ing_bun".to_string(),
                    quantity_required: dec!(1),
                },
                RecipeLine {
                    ingredient_id: "ing_patty".to_string(),
                    quantity_required: dec!(1),
                },
                RecipeLine {
                    ingredient_id: "ing_lettuce".to_string(),
                    quantity_required: dec!(20),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_preserves_recipe_order() {
        let db = db_with_ingredients(&["ing_bun", "ing_patty", "ing_lettuce"]).await;
        let repo = db.products();

        repo.insert(&classic_burger()).await.unwrap();

        let loaded = repo.get_by_id("prod_classic_burger").await.unwrap().unwrap();
        assert_eq!(loaded, classic_burger());

        let order: Vec<&str> = loaded
            .recipe
            .iter()
            .map(|l| l.ingredient_id.as_str())
            .collect();
        assert_eq!(order, vec!["ing_bun", "ing_patty", "ing_lettuce"]);
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_recipe_ingredient() {
        let db = db_with_ingredients(&["ing_bun"]).await;
        let repo = db.products();

        let err = repo.insert(&classic_burger()).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert!(repo.get_by_id("prod_classic_burger").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_non_positive_recipe_quantity() {
        let db = db_with_ingredients(&["ing_bun"]).await;
        let repo = db.products();

        let mut product = classic_burger();
        product.recipe = vec![RecipeLine {
            ingredient_id: "ing_bun".to_string(),
            quantity_required: Decimal::ZERO,
        }];

        assert!(matches!(
            repo.insert(&product).await.unwrap_err(),
            DbError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_stock_free_product_allowed() {
        let db = db_with_ingredients(&[]).await;
        let repo = db.products();

        let product = Product {
            id: "prod_service".to_string(),
            name: "Catering Fee".to_string(),
            category: "Services".to_string(),
            base_price: Money::new(dec!(500.00)),
            recipe: Vec::new(),
        };
        repo.insert(&product).await.unwrap();

        let loaded = repo.get_by_id("prod_service").await.unwrap().unwrap();
        assert!(loaded.is_stock_free());
    }

    #[tokio::test]
    async fn test_catalog_port_round_trip() {
        let db = db_with_ingredients(&["ing_bun", "ing_patty", "ing_lettuce"]).await;
        let repo = db.products();
        repo.insert(&classic_burger()).await.unwrap();

        let via_port = Catalog::product(&repo, "prod_classic_burger").await.unwrap();
        assert_eq!(via_port, Some(classic_burger()));

        let ingredient = Catalog::ingredient(&repo, "ing_bun").await.unwrap();
        assert_eq!(ingredient.unwrap().id, "ing_bun");

        assert!(Catalog::product(&repo, "prod_ghost").await.unwrap().is_none());
    }
}
