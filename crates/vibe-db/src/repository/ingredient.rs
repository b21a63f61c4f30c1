//! # Ingredient Repository
//!
//! Database operations for ingredients, including the stock ledger.
//!
//! ## The Atomicity Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              apply_decrements: one transaction, all or nothing          │
//! │                                                                         │
//! │  BEGIN IMMEDIATE        ← take the write lock up front; competing      │
//! │       │                   batches queue on the busy timeout            │
//! │       ▼                                                                 │
//! │  for each ingredient:                                                  │
//! │       SELECT stock, version                                            │
//! │       version ≠ read version?  → ROLLBACK, VersionConflict             │
//! │       stock < required?        → ROLLBACK, OutOfStock                  │
//! │       UPDATE ... WHERE id AND version = read version                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT                 ← only point where anything becomes visible    │
//! │                                                                         │
//! │  ❌ WRONG: N independent single-key updates (partial failure leaks)    │
//! │  ✅ CORRECT: one transaction over the whole batch                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock and money columns are canonical decimal TEXT; every comparison
//! happens in Rust after parsing, never in SQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use vibe_core::error::StoreError;
use vibe_core::money::Money;
use vibe_core::types::{DecrementBatch, Ingredient, StockSnapshot};
use vibe_core::StockLedger;

/// Parses a decimal TEXT column, reporting the column on corruption.
pub(crate) fn parse_decimal(raw: &str, column: &str) -> DbResult<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|e| DbError::decode(format!("{}: {}", column, e)))
}

/// Repository for ingredient database operations.
///
/// Doubles as the [`StockLedger`] port implementation: versioned snapshot
/// reads plus the transactional batch decrement.
#[derive(Debug, Clone)]
pub struct IngredientRepository {
    pool: SqlitePool,
}

impl IngredientRepository {
    /// Creates a new IngredientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        IngredientRepository { pool }
    }

    /// Inserts a new ingredient.
    pub async fn insert(&self, ingredient: &Ingredient) -> DbResult<()> {
        debug!(id = %ingredient.id, "Inserting ingredient");

        vibe_core::validation::validate_entity_id(&ingredient.id)?;
        vibe_core::validation::validate_name(&ingredient.name)?;
        vibe_core::validation::validate_stock_quantity("currentStock", ingredient.current_stock)?;
        vibe_core::validation::validate_stock_quantity(
            "lowStockThreshold",
            ingredient.low_stock_threshold,
        )?;

        sqlx::query(
            r#"
            INSERT INTO ingredients (
                id, name, unit,
                current_stock, low_stock_threshold, cost,
                version, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(&ingredient.unit)
        .bind(ingredient.current_stock.to_string())
        .bind(ingredient.low_stock_threshold.to_string())
        .bind(ingredient.cost.amount().to_string())
        .bind(ingredient.version)
        .bind(ingredient.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an ingredient by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Ingredient>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, unit, current_stock, low_stock_threshold,
                   cost, version, updated_at
            FROM ingredients
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ingredient_from_row).transpose()
    }

    /// Lists every ingredient, ordered by name (the inventory screen view).
    pub async fn list_all(&self) -> DbResult<Vec<Ingredient>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, unit, current_stock, low_stock_threshold,
                   cost, version, updated_at
            FROM ingredients
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ingredient_from_row).collect()
    }

    /// Counts ingredients at or below their alert threshold.
    ///
    /// Decimal columns are TEXT, so the comparison runs in Rust over the
    /// full list; ingredient counts are small.
    pub async fn count_low_stock(&self) -> DbResult<usize> {
        let ingredients = self.list_all().await?;
        Ok(ingredients.iter().filter(|i| i.is_low_stock()).count())
    }

    /// Applies a manual stock adjustment (restock or write-off).
    ///
    /// ## Arguments
    /// * `id` - Ingredient to adjust
    /// * `delta` - Change in stock: positive for restocking, negative for
    ///   spoilage write-offs
    ///
    /// The adjustment is version-guarded like any other ledger write and
    /// refuses to drive stock negative.
    pub async fn adjust_stock(&self, id: &str, delta: Decimal) -> DbResult<Ingredient> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = adjust_in_tx(&mut conn, id, delta).await;
        match &result {
            Ok(_) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
            }
            Err(_) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
            }
        }
        result
    }
}

async fn adjust_in_tx(
    conn: &mut SqliteConnection,
    id: &str,
    delta: Decimal,
) -> DbResult<Ingredient> {
    let row = sqlx::query(
        r#"
        SELECT id, name, unit, current_stock, low_stock_threshold,
               cost, version, updated_at
        FROM ingredients
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Ingredient", id))?;

    let mut ingredient = ingredient_from_row(row)?;
    let new_stock = ingredient.current_stock + delta;
    if new_stock < Decimal::ZERO {
        return Err(DbError::TransactionFailed(format!(
            "adjustment would drive {} stock below zero",
            id
        )));
    }

    let now = Utc::now();
    sqlx::query(
        r#"
        UPDATE ingredients
        SET current_stock = ?2, version = version + 1, updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(new_stock.to_string())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    ingredient.current_stock = new_stock;
    ingredient.version += 1;
    ingredient.updated_at = now;
    Ok(ingredient)
}

/// Maps a full ingredient row into the domain type.
fn ingredient_from_row(row: sqlx::sqlite::SqliteRow) -> DbResult<Ingredient> {
    let current_stock: String = row.try_get("current_stock")?;
    let low_stock_threshold: String = row.try_get("low_stock_threshold")?;
    let cost: String = row.try_get("cost")?;

    Ok(Ingredient {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        unit: row.try_get("unit")?,
        current_stock: parse_decimal(&current_stock, "current_stock")?,
        low_stock_threshold: parse_decimal(&low_stock_threshold, "low_stock_threshold")?,
        cost: Money::new(parse_decimal(&cost, "cost")?),
        version: row.try_get("version")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

// =============================================================================
// Stock Ledger Port
// =============================================================================

#[async_trait]
impl StockLedger for IngredientRepository {
    async fn snapshot(&self, ids: &[String]) -> Result<HashMap<String, StockSnapshot>, StoreError> {
        let mut out = HashMap::with_capacity(ids.len());

        for id in ids {
            let row = sqlx::query("SELECT current_stock, version FROM ingredients WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(DbError::from)?
                .ok_or_else(|| StoreError::not_found("Ingredient", id))?;

            let raw_stock: String = row.try_get("current_stock").map_err(DbError::from)?;
            out.insert(
                id.clone(),
                StockSnapshot {
                    stock: parse_decimal(&raw_stock, "current_stock")?,
                    version: row.try_get("version").map_err(DbError::from)?,
                },
            );
        }

        Ok(out)
    }

    async fn apply_decrements(&self, batch: &DecrementBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;

        // BEGIN IMMEDIATE takes the write lock before any read, so the
        // rows we validate are the rows we update. Competing batches wait
        // on the busy timeout and then see committed state, surfacing as
        // a version conflict rather than a failed snapshot upgrade.
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(DbError::from)?;

        let result = apply_batch_in_tx(&mut conn, batch).await;
        match &result {
            Ok(()) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .map_err(DbError::from)?;
                debug!(ingredients = batch.len(), "Stock batch committed");
            }
            Err(_) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
            }
        }
        result
    }
}

/// Validates and applies every decrement inside the open transaction.
/// Any error propagates before COMMIT, so the caller rolls back in full.
async fn apply_batch_in_tx(
    conn: &mut SqliteConnection,
    batch: &DecrementBatch,
) -> Result<(), StoreError> {
    let now = Utc::now();

    for (id, decrement) in batch {
        let row = sqlx::query("SELECT current_stock, version FROM ingredients WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| StoreError::not_found("Ingredient", id))?;

        let version: i64 = row.try_get("version").map_err(DbError::from)?;
        let raw_stock: String = row.try_get("current_stock").map_err(DbError::from)?;
        let stock = parse_decimal(&raw_stock, "current_stock")?;

        // Version first: a stale read is a conflict even if stock would
        // still suffice, because the demand was validated against old data.
        if version != decrement.version_read {
            return Err(StoreError::VersionConflict(id.clone()));
        }

        if stock < decrement.required {
            return Err(StoreError::OutOfStock {
                ingredient_id: id.clone(),
                needed: decrement.required,
                available: stock,
            });
        }

        let new_stock = stock - decrement.required;
        let updated = sqlx::query(
            r#"
            UPDATE ingredients
            SET current_stock = ?2, version = version + 1, updated_at = ?3
            WHERE id = ?1 AND version = ?4
            "#,
        )
        .bind(id)
        .bind(new_stock.to_string())
        .bind(now)
        .bind(decrement.version_read)
        .execute(&mut *conn)
        .await
        .map_err(DbError::from)?;

        if updated.rows_affected() != 1 {
            return Err(StoreError::VersionConflict(id.clone()));
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
