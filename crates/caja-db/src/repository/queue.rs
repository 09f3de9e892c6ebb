//! # Action Queue Repository
//!
//! Durable outbound replication queue.
//!
//! ## The Queue Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Action Queue Lifecycle                               │
//! │                                                                         │
//! │  LOCAL OPERATION (e.g., record_sale)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   SINGLE TRANSACTION                            │    │
//! │  │                                                                 │    │
//! │  │  1. INSERT sale, sale_items, movements, audit row               │    │
//! │  │                                                                 │    │
//! │  │  2. INSERT INTO action_queue (kind, entity_id, payload)         │    │
//! │  │     VALUES ('SALE', ?, <typed envelope JSON>)                   │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← Both succeed or both fail                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PUSH PROTOCOL (caja-sync)                                              │
//! │       │                                                                 │
//! │       ├── remote accepted  → DELETE the entry                           │
//! │       └── remote failed    → attempts += 1, last_error = ?, entry stays │
//! │                                                                         │
//! │  KEY GUARANTEES:                                                        │
//! │  • An action is never lost (it's in the local DB)                       │
//! │  • A queue entry is never orphaned (same transaction)                   │
//! │  • Drain order is global FIFO (seq AUTOINCREMENT)                       │
//! │  • Delivery is at-least-once; the remote dedups by idempotent upsert    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use caja_core::queue::QueuePayload;
use caja_core::{QueueEntry, QueueKind};

// =============================================================================
// Transaction-Scoped Writes
// =============================================================================

/// Appends a typed payload to the action queue inside the caller's
/// transaction.
///
/// ## Example
/// ```rust,ignore
/// let mut tx = db.begin().await?;
/// // ... entity writes ...
/// enqueue(&mut tx, &QueuePayload::Movement(movement)).await?;
/// tx.commit().await?;
/// ```
pub async fn enqueue(conn: &mut SqliteConnection, payload: &QueuePayload) -> DbResult<QueueEntry> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let kind = payload.kind();
    let entity_id = payload.entity_id().to_string();
    let json = serde_json::to_string(payload)?;

    debug!(kind = ?kind, entity_id = %entity_id, "Enqueuing action");

    let result = sqlx::query(
        r#"
        INSERT INTO action_queue (id, kind, entity_id, payload, attempts, last_error, created_at)
        VALUES (?1, ?2, ?3, ?4, 0, NULL, ?5)
        "#,
    )
    .bind(&id)
    .bind(kind)
    .bind(&entity_id)
    .bind(&json)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(QueueEntry {
        seq: result.last_insert_rowid(),
        id,
        kind,
        entity_id,
        payload: json,
        attempts: 0,
        last_error: None,
        created_at: now,
    })
}

// =============================================================================
// Repository (Pool Reads + Sync-Engine Bookkeeping)
// =============================================================================

/// Repository for action queue operations.
#[derive(Debug, Clone)]
pub struct QueueRepository {
    pool: SqlitePool,
}

impl QueueRepository {
    /// Creates a new QueueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QueueRepository { pool }
    }

    /// Gets pending entries in global FIFO order (oldest first).
    ///
    /// ## Arguments
    /// * `limit` - Maximum entries to return
    pub async fn pending(&self, limit: u32) -> DbResult<Vec<QueueEntry>> {
        let entries = sqlx::query_as::<_, QueueEntry>(
            r#"
            SELECT seq, id, kind, entity_id, payload, attempts, last_error, created_at
            FROM action_queue
            ORDER BY seq ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Counts queued entries (UI badge: "N actions waiting to sync").
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM action_queue")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Removes one entry after the remote accepted it.
    pub async fn remove(&self, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM action_queue WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Removes every entry of one kind for an entity.
    ///
    /// ## When This Occurs
    /// The status-driven push phases upload whole entities; once the remote
    /// accepts a product or sale, all queue entries snapshotting it are
    /// redundant.
    pub async fn remove_for_entity(&self, kind: QueueKind, entity_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM action_queue WHERE kind = ?1 AND entity_id = ?2")
            .bind(kind)
            .bind(entity_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Records a failed delivery attempt; the entry stays queued.
    pub async fn record_failure(&self, id: &str, error: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE action_queue SET attempts = attempts + 1, last_error = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
