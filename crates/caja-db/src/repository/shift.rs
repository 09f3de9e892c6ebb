//! # Shift Repository
//!
//! Cash shift and cash movement persistence.
//!
//! ## The Open-Shift Singleton
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  At most ONE open shift per business.                                   │
//! │                                                                         │
//! │  ops::shift::open_shift                                                 │
//! │       │                                                                 │
//! │       ▼  inside the open transaction                                    │
//! │  find_open(&mut tx, business_id)                                        │
//! │       │                                                                 │
//! │       ├── Some(shift) → ShiftAlreadyOpen, rollback                      │
//! │       └── None        → insert new open shift                           │
//! │                                                                         │
//! │  Sales and cash movements resolve the open shift the same way and      │
//! │  refuse to write without one.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use caja_core::{CashMovement, CashMovementKind, CashShift, ShiftStatus, SyncStatus};

// =============================================================================
// Transaction-Scoped Writes
// =============================================================================

/// Inserts a new shift row inside the caller's transaction.
pub async fn insert_shift(conn: &mut SqliteConnection, shift: &CashShift) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO cash_shifts (
            id, business_id, opened_by, start_amount_cents, opened_at, status,
            end_amount_cents, expected_cents, difference_cents, closed_at, sync_status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&shift.id)
    .bind(&shift.business_id)
    .bind(&shift.opened_by)
    .bind(shift.start_amount_cents)
    .bind(shift.opened_at)
    .bind(shift.status)
    .bind(shift.end_amount_cents)
    .bind(shift.expected_cents)
    .bind(shift.difference_cents)
    .bind(shift.closed_at)
    .bind(shift.sync_status)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Finds the open shift for a business inside the caller's transaction.
pub async fn find_open(
    conn: &mut SqliteConnection,
    business_id: &str,
) -> DbResult<Option<CashShift>> {
    let shift = sqlx::query_as::<_, CashShift>(
        r#"
        SELECT id, business_id, opened_by, start_amount_cents, opened_at, status,
               end_amount_cents, expected_cents, difference_cents, closed_at, sync_status
        FROM cash_shifts
        WHERE business_id = ?1 AND status = ?2
        "#,
    )
    .bind(business_id)
    .bind(ShiftStatus::Open)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(shift)
}

/// Re-reads a shift by ID inside the caller's transaction.
pub async fn get_shift(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<CashShift>> {
    let shift = sqlx::query_as::<_, CashShift>(
        r#"
        SELECT id, business_id, opened_by, start_amount_cents, opened_at, status,
               end_amount_cents, expected_cents, difference_cents, closed_at, sync_status
        FROM cash_shifts
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(shift)
}

/// Writes the close columns of a shift inside the caller's transaction.
///
/// `Closed` is terminal; nothing ever flips a shift back to open.
pub async fn close_shift_row(
    conn: &mut SqliteConnection,
    id: &str,
    end_amount_cents: i64,
    expected_cents: i64,
    difference_cents: i64,
    closed_at: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE cash_shifts SET
            status = ?2, end_amount_cents = ?3, expected_cents = ?4,
            difference_cents = ?5, closed_at = ?6, sync_status = ?7
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(ShiftStatus::Closed)
    .bind(end_amount_cents)
    .bind(expected_cents)
    .bind(difference_cents)
    .bind(closed_at)
    .bind(SyncStatus::PendingUpdate)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Appends a manual cash movement inside the caller's transaction.
pub async fn insert_cash_movement(
    conn: &mut SqliteConnection,
    movement: &CashMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO cash_movements (
            id, business_id, shift_id, kind, amount_cents, reason, staff_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.business_id)
    .bind(&movement.shift_id)
    .bind(movement.kind)
    .bind(movement.amount_cents)
    .bind(&movement.reason)
    .bind(&movement.staff_id)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Sums one direction of manual cash movements for a shift, inside the
/// caller's transaction.
pub async fn sum_cash_movements(
    conn: &mut SqliteConnection,
    shift_id: &str,
    kind: CashMovementKind,
) -> DbResult<i64> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount_cents), 0)
        FROM cash_movements
        WHERE shift_id = ?1 AND kind = ?2
        "#,
    )
    .bind(shift_id)
    .bind(kind)
    .fetch_one(&mut *conn)
    .await?;

    Ok(total)
}

// =============================================================================
// Repository (Pool Reads + Sync-Engine Hooks)
// =============================================================================

/// Repository for cash shift operations.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Gets a shift by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<CashShift>> {
        let shift = sqlx::query_as::<_, CashShift>(
            r#"
            SELECT id, business_id, opened_by, start_amount_cents, opened_at, status,
                   end_amount_cents, expected_cents, difference_cents, closed_at, sync_status
            FROM cash_shifts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Gets the currently open shift for a business, if any.
    pub async fn open_shift(&self, business_id: &str) -> DbResult<Option<CashShift>> {
        let shift = sqlx::query_as::<_, CashShift>(
            r#"
            SELECT id, business_id, opened_by, start_amount_cents, opened_at, status,
                   end_amount_cents, expected_cents, difference_cents, closed_at, sync_status
            FROM cash_shifts
            WHERE business_id = ?1 AND status = ?2
            "#,
        )
        .bind(business_id)
        .bind(ShiftStatus::Open)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Lists shifts of a business, newest first.
    pub async fn list(&self, business_id: &str, limit: u32) -> DbResult<Vec<CashShift>> {
        let shifts = sqlx::query_as::<_, CashShift>(
            r#"
            SELECT id, business_id, opened_by, start_amount_cents, opened_at, status,
                   end_amount_cents, expected_cents, difference_cents, closed_at, sync_status
            FROM cash_shifts
            WHERE business_id = ?1
            ORDER BY opened_at DESC
            LIMIT ?2
            "#,
        )
        .bind(business_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    /// Manual cash movements of a shift, oldest first.
    pub async fn movements(&self, shift_id: &str) -> DbResult<Vec<CashMovement>> {
        let movements = sqlx::query_as::<_, CashMovement>(
            r#"
            SELECT id, business_id, shift_id, kind, amount_cents, reason, staff_id, created_at
            FROM cash_movements
            WHERE shift_id = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Marks a shift as accepted by the remote.
    pub async fn set_synced(&self, id: &str) -> DbResult<()> {
        sqlx::query("UPDATE cash_shifts SET sync_status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(SyncStatus::Synced)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
