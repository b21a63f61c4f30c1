//! # Settings Repository
//!
//! Store-wide configuration persisted as a single JSON document under the
//! key `global_config`, and the PolicyProvider port implementation.
//!
//! The whole document is replaced on update; there is exactly one store
//! per database, so no per-field patching is needed.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use vibe_core::error::StoreError;
use vibe_core::types::{StoreSettings, TaxPolicy};
use vibe_core::PolicyProvider;

/// The fixed document key for the single store configuration.
pub const SETTINGS_KEY: &str = "global_config";

/// Repository for the store settings document.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Loads the settings document, if one has been written.
    pub async fn get(&self) -> DbResult<Option<StoreSettings>> {
        let row = sqlx::query("SELECT document FROM settings WHERE id = ?1")
            .bind(SETTINGS_KEY)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let document: String = row.try_get("document")?;
        serde_json::from_str(&document)
            .map(Some)
            .map_err(|e| DbError::decode(format!("settings document: {}", e)))
    }

    /// Writes (or replaces) the settings document.
    pub async fn upsert(&self, settings: &StoreSettings) -> DbResult<()> {
        debug!(store = %settings.store_name, "Updating settings");

        vibe_core::validation::validate_name(&settings.store_name)?;
        vibe_core::validation::validate_rate("vatRate", settings.tax_settings.vat_rate)?;
        vibe_core::validation::validate_rate(
            "serviceChargeRate",
            settings.tax_settings.service_charge_rate,
        )?;

        let document = serde_json::to_string(settings)
            .map_err(|e| DbError::Internal(format!("settings serialization: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO settings (id, document, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET document = ?2, updated_at = ?3
            "#,
        )
        .bind(SETTINGS_KEY)
        .bind(document)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Policy Provider Port
// =============================================================================

#[async_trait]
impl PolicyProvider for SettingsRepository {
    async fn current_policy(&self) -> Result<TaxPolicy, StoreError> {
        let settings = self
            .get()
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| StoreError::not_found("Settings", SETTINGS_KEY))?;
        Ok(settings.tax_settings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal_macros::dec;

    fn sample_settings() -> StoreSettings {
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

    #[tokio::test]
    async fn test_get_before_any_write() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.settings().get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_round_trip_and_replace() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        repo.upsert(&sample_settings()).await.unwrap();
        assert_eq!(repo.get().await.unwrap(), Some(sample_settings()));

        // Toggling the service charge off replaces the document.
        let mut changed = sample_settings();
        changed.tax_settings.service_charge_rate = dec!(0);
        repo.upsert(&changed).await.unwrap();
        assert_eq!(repo.get().await.unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn test_upsert_rejects_bad_rate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        let mut bad = sample_settings();
        bad.tax_settings.vat_rate = dec!(1.5);
        assert!(matches!(
            repo.upsert(&bad).await.unwrap_err(),
            DbError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_policy_port() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        let err = repo.current_policy().await.unwrap_err();
        assert_eq!(err, StoreError::not_found("Settings", SETTINGS_KEY));

        repo.upsert(&sample_settings()).await.unwrap();
        let policy = repo.current_policy().await.unwrap();
        assert_eq!(policy.vat_rate, dec!(0.12));
    }
}
