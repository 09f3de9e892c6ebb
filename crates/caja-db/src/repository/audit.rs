//! # Audit Log Repository
//!
//! Append-only audit trail of business-relevant actions.
//!
//! An audit row is written transactionally alongside the state change it
//! documents, together with its own AUDIT queue entry, so a recorded action
//! always refers to a change that actually committed.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::queue;
use caja_core::queue::QueuePayload;
use caja_core::{AuditAction, AuditLog, BusinessContext, SyncStatus};

// =============================================================================
// Transaction-Scoped Writes
// =============================================================================

/// Appends an audit row plus its replication queue entry, inside the
/// caller's transaction.
///
/// ## Arguments
/// * `ctx` - Tenant + actor scope; staff name is snapshotted into the row
/// * `action` - What happened
/// * `details` - Structured details payload, stored as JSON text
///
/// ## Example
/// ```rust,ignore
/// log_action(&mut tx, &ctx, AuditAction::CashOut,
///     serde_json::json!({ "amount_cents": 2000, "reason": "proveedor" })).await?;
/// ```
pub async fn log_action(
    conn: &mut SqliteConnection,
    ctx: &BusinessContext,
    action: AuditAction,
    details: serde_json::Value,
) -> DbResult<AuditLog> {
    let entry = AuditLog {
        id: Uuid::new_v4().to_string(),
        business_id: ctx.business_id.clone(),
        staff_id: ctx.staff_id.clone(),
        staff_name: ctx.staff_name.clone(),
        action,
        details: details.to_string(),
        created_at: Utc::now(),
        sync_status: SyncStatus::PendingCreate,
    };

    sqlx::query(
        r#"
        INSERT INTO audit_log (
            id, business_id, staff_id, staff_name, action, details, created_at, sync_status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.business_id)
    .bind(&entry.staff_id)
    .bind(&entry.staff_name)
    .bind(entry.action)
    .bind(&entry.details)
    .bind(entry.created_at)
    .bind(entry.sync_status)
    .execute(&mut *conn)
    .await?;

    queue::enqueue(conn, &QueuePayload::Audit(entry.clone())).await?;

    Ok(entry)
}

// =============================================================================
// Repository (Pool Reads + Sync-Engine Hooks)
// =============================================================================

/// Repository for audit log reads.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Recent audit entries for a business, newest first.
    pub async fn recent(&self, business_id: &str, limit: u32) -> DbResult<Vec<AuditLog>> {
        let entries = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, business_id, staff_id, staff_name, action, details, created_at, sync_status
            FROM audit_log
            WHERE business_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(business_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Marks an audit entry as accepted by the remote.
    pub async fn set_synced(&self, id: &str) -> DbResult<()> {
        sqlx::query("UPDATE audit_log SET sync_status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(SyncStatus::Synced)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
