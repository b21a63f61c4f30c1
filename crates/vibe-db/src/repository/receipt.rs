//! # Receipt Repository
//!
//! Persistence for completed sale records, and the ReceiptSink port
//! implementation.
//!
//! A receipt and its lines are written in one transaction; history queries
//! (`recent`, `total_revenue`) back the dashboard's sales feed and revenue
//! card.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::ingredient::parse_decimal;
use vibe_core::error::StoreError;
use vibe_core::money::Money;
use vibe_core::types::{Receipt, ReceiptLine, ReceiptStatus};
use vibe_core::ReceiptSink;

/// Repository for receipt database operations.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Inserts a receipt and its lines in one transaction.
    pub async fn insert(&self, receipt: &Receipt) -> DbResult<()> {
        debug!(id = %receipt.id, receipt_number = %receipt.receipt_number, "Inserting receipt");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO receipts (
                id, receipt_number,
                subtotal, vatable_sales, vat_amount, service_charge, grand_total,
                timestamp, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&receipt.id)
        .bind(&receipt.receipt_number)
        .bind(receipt.subtotal.amount().to_string())
        .bind(receipt.vatable_sales.amount().to_string())
        .bind(receipt.vat_amount.amount().to_string())
        .bind(receipt.service_charge.amount().to_string())
        .bind(receipt.grand_total.amount().to_string())
        .bind(receipt.timestamp)
        .bind(status_to_str(receipt.status))
        .execute(&mut *tx)
        .await?;

        for (position, line) in receipt.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO receipt_lines (
                    receipt_id, position, product_id, name,
                    quantity, unit_price, line_total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&receipt.id)
            .bind(position as i64)
            .bind(&line.product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price.amount().to_string())
            .bind(line.line_total.amount().to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets a receipt by its ID, lines included.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Receipt>> {
        let row = sqlx::query(
            r#"
            SELECT id, receipt_number, subtotal, vatable_sales, vat_amount,
                   service_charge, grand_total, timestamp, status
            FROM receipts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = self.lines_of(id).await?;
        Ok(Some(receipt_from_row(row, lines)?))
    }

    /// Lists the most recent receipts, newest first (the dashboard feed).
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Receipt>> {
        let rows = sqlx::query(
            r#"
            SELECT id, receipt_number, subtotal, vatable_sales, vat_amount,
                   service_charge, grand_total, timestamp, status
            FROM receipts
            ORDER BY timestamp DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut receipts = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let lines = self.lines_of(&id).await?;
            receipts.push(receipt_from_row(row, lines)?);
        }
        Ok(receipts)
    }

    /// Sums the grand totals of every completed receipt.
    ///
    /// Money columns are TEXT, so the sum runs in Rust.
    pub async fn total_revenue(&self) -> DbResult<Money> {
        let rows = sqlx::query("SELECT grand_total FROM receipts WHERE status = 'completed'")
            .fetch_all(&self.pool)
            .await?;

        let mut total = Money::ZERO;
        for row in rows {
            let raw: String = row.try_get("grand_total")?;
            total += Money::new(parse_decimal(&raw, "grand_total")?);
        }
        Ok(total)
    }

    /// Loads a receipt's lines in printed order.
    async fn lines_of(&self, receipt_id: &str) -> DbResult<Vec<ReceiptLine>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, name, quantity, unit_price, line_total
            FROM receipt_lines
            WHERE receipt_id = ?1
            ORDER BY position
            "#,
        )
        .bind(receipt_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let unit_price: String = row.try_get("unit_price")?;
                let line_total: String = row.try_get("line_total")?;
                Ok(ReceiptLine {
                    product_id: row.try_get("product_id")?,
                    name: row.try_get("name")?,
                    quantity: row.try_get("quantity")?,
                    unit_price: Money::new(parse_decimal(&unit_price, "unit_price")?),
                    line_total: Money::new(parse_decimal(&line_total, "line_total")?),
                })
            })
            .collect()
    }
}

fn receipt_from_row(row: sqlx::sqlite::SqliteRow, lines: Vec<ReceiptLine>) -> DbResult<Receipt> {
    let subtotal: String = row.try_get("subtotal")?;
    let vatable_sales: String = row.try_get("vatable_sales")?;
    let vat_amount: String = row.try_get("vat_amount")?;
    let service_charge: String = row.try_get("service_charge")?;
    let grand_total: String = row.try_get("grand_total")?;
    let status: String = row.try_get("status")?;

    Ok(Receipt {
        id: row.try_get("id")?,
        receipt_number: row.try_get("receipt_number")?,
        lines,
        subtotal: Money::new(parse_decimal(&subtotal, "subtotal")?),
        vatable_sales: Money::new(parse_decimal(&vatable_sales, "vatable_sales")?),
        vat_amount: Money::new(parse_decimal(&vat_amount, "vat_amount")?),
        service_charge: Money::new(parse_decimal(&service_charge, "service_charge")?),
        grand_total: Money::new(parse_decimal(&grand_total, "grand_total")?),
        timestamp: row.try_get::<DateTime<Utc>, _>("timestamp")?,
        status: status_from_str(&status)?,
    })
}

fn status_to_str(status: ReceiptStatus) -> &'static str {
    match status {
        ReceiptStatus::Completed => "completed",
        ReceiptStatus::Failed => "failed",
    }
}

fn status_from_str(raw: &str) -> DbResult<ReceiptStatus> {
    match raw {
        "completed" => Ok(ReceiptStatus::Completed),
        "failed" => Ok(ReceiptStatus::Failed),
        other => Err(DbError::decode(format!("status: unknown value '{}'", other))),
    }
}

// =============================================================================
// Receipt Sink Port
// =============================================================================

#[async_trait]
impl ReceiptSink for ReceiptRepository {
    async fn persist(&self, receipt: &Receipt) -> Result<(), StoreError> {
        self.insert(receipt).await.map_err(Into::into)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn receipt(id: &str, grand_total: rust_decimal::Decimal, timestamp: DateTime<Utc>) -> Receipt {
        Receipt {
            id: id.to_string(),
            receipt_number: format!("260806-{}", id),
            lines: vec![ReceiptLine {
                product_id: "prod_classic_burger".to_string(),
                name: "Classic Cheeseburger".to_string(),
                quantity: 2,
                unit_price: Money::new(dec!(150.00)),
                line_total: Money::new(dec!(300.00)),
            }],
            subtotal: Money::new(dec!(300.00)),
            vatable_sales: Money::new(dec!(267.86)),
            vat_amount: Money::new(dec!(32.14)),
            service_charge: Money::new(dec!(30.00)),
            grand_total: Money::new(grand_total),
            timestamp,
            status: ReceiptStatus::Completed,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.receipts();

        let original = receipt("r1", dec!(330.00), Utc::now());
        repo.insert(&original).await.unwrap();

        let loaded = repo.get_by_id("r1").await.unwrap().unwrap();
        assert_eq!(loaded.receipt_number, original.receipt_number);
        assert_eq!(loaded.grand_total, original.grand_total);
        assert_eq!(loaded.lines, original.lines);
        assert_eq!(loaded.status, ReceiptStatus::Completed);
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.receipts();

        let base = Utc::now();
        repo.insert(&receipt("r_old", dec!(100.00), base - Duration::minutes(10)))
            .await
            .unwrap();
        repo.insert(&receipt("r_new", dec!(200.00), base)).await.unwrap();
        repo.insert(&receipt("r_mid", dec!(150.00), base - Duration::minutes(5)))
            .await
            .unwrap();

        let ids: Vec<String> = repo
            .recent(2)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["r_new", "r_mid"]);
    }

    #[tokio::test]
    async fn test_total_revenue_sums_completed_only() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.receipts();

        repo.insert(&receipt("r1", dec!(330.00), Utc::now())).await.unwrap();
        repo.insert(&receipt("r2", dec!(594.00), Utc::now())).await.unwrap();

        let mut failed = receipt("r3", dec!(1000.00), Utc::now());
        failed.status = ReceiptStatus::Failed;
        repo.insert(&failed).await.unwrap();

        assert_eq!(repo.total_revenue().await.unwrap(), Money::new(dec!(924.00)));
    }
}
