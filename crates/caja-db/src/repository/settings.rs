//! # Business Settings Repository
//!
//! Singleton-per-business settings row, keyed by the business id.
//!
//! Settings participate in sync both ways: the pull protocol upserts the
//! remote profile, the push protocol uploads the local row unconditionally
//! at the end of every cycle.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use caja_core::{BusinessSettings, SyncStatus};

// =============================================================================
// Transaction-Scoped Writes
// =============================================================================

/// Upserts the settings row inside the caller's transaction.
pub async fn upsert_settings(
    conn: &mut SqliteConnection,
    settings: &BusinessSettings,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO business_settings (
            business_id, name, address, phone, receipt_message, status, sync_status, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT (business_id) DO UPDATE SET
            name = excluded.name,
            address = excluded.address,
            phone = excluded.phone,
            receipt_message = excluded.receipt_message,
            status = excluded.status,
            sync_status = excluded.sync_status,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&settings.business_id)
    .bind(&settings.name)
    .bind(&settings.address)
    .bind(&settings.phone)
    .bind(&settings.receipt_message)
    .bind(settings.status)
    .bind(settings.sync_status)
    .bind(settings.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Reads the settings row inside the caller's transaction.
pub async fn get_settings(
    conn: &mut SqliteConnection,
    business_id: &str,
) -> DbResult<Option<BusinessSettings>> {
    let settings = sqlx::query_as::<_, BusinessSettings>(
        r#"
        SELECT business_id, name, address, phone, receipt_message, status,
               sync_status, updated_at
        FROM business_settings
        WHERE business_id = ?1
        "#,
    )
    .bind(business_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(settings)
}

// =============================================================================
// Repository (Pool Reads + Sync-Engine Hooks)
// =============================================================================

/// Repository for business settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets the settings row for a business, if present.
    pub async fn get(&self, business_id: &str) -> DbResult<Option<BusinessSettings>> {
        let settings = sqlx::query_as::<_, BusinessSettings>(
            r#"
            SELECT business_id, name, address, phone, receipt_message, status,
                   sync_status, updated_at
            FROM business_settings
            WHERE business_id = ?1
            "#,
        )
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Upserts the remote profile during pull, marked `synced`.
    ///
    /// The business id IS the singleton key, so a profile fetched for one
    /// business can never clobber another tenant's row.
    pub async fn merge_from_remote(&self, settings: &BusinessSettings) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        let merged = BusinessSettings {
            sync_status: SyncStatus::Synced,
            ..settings.clone()
        };
        upsert_settings(&mut conn, &merged).await
    }

    /// Marks the settings row as accepted by the remote.
    pub async fn set_synced(&self, business_id: &str) -> DbResult<()> {
        sqlx::query("UPDATE business_settings SET sync_status = ?2 WHERE business_id = ?1")
            .bind(business_id)
            .bind(SyncStatus::Synced)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
