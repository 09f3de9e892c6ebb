//! # Sale Repository
//!
//! Sale and sale-item persistence.
//!
//! Sales are written only by `ops::sale::record_sale` (one transaction for
//! sale + items + stock + movements + loyalty + audit + queue). This module
//! holds the tx-scoped inserts that transaction composes, plus pool reads
//! for history screens and the push protocol.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use caja_core::{PaymentMethod, Sale, SaleItem, SyncStatus};

// =============================================================================
// Transaction-Scoped Writes
// =============================================================================

/// Inserts the sale header row inside the caller's transaction.
pub async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, business_id, shift_id, staff_id, total_cents, payment_method,
            tendered_cents, change_cents, customer_id, sync_status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.business_id)
    .bind(&sale.shift_id)
    .bind(&sale.staff_id)
    .bind(sale.total_cents)
    .bind(sale.payment_method)
    .bind(sale.tendered_cents)
    .bind(sale.change_cents)
    .bind(&sale.customer_id)
    .bind(sale.sync_status)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts one frozen line item inside the caller's transaction.
pub async fn insert_sale_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, name_snapshot, quantity,
            unit_price_cents, unit_cost_cents, line_total_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.name_snapshot)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.unit_cost_cents)
    .bind(item.line_total_cents)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Sums cash-tender sales for a shift, inside the caller's transaction.
///
/// ## When This Occurs
/// Shift close computes expected drawer cash against the live sales of the
/// shift being closed; reading inside the close transaction keeps the sum
/// and the status flip atomic.
pub async fn sum_cash_sales(conn: &mut SqliteConnection, shift_id: &str) -> DbResult<i64> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(total_cents), 0)
        FROM sales
        WHERE shift_id = ?1 AND payment_method = ?2
        "#,
    )
    .bind(shift_id)
    .bind(PaymentMethod::Efectivo)
    .fetch_one(&mut *conn)
    .await?;

    Ok(total)
}

// =============================================================================
// Repository (Pool Reads + Sync-Engine Hooks)
// =============================================================================

/// Repository for sale operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, business_id, shift_id, staff_id, total_cents, payment_method,
                   tendered_cents, change_cents, customer_id, sync_status, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets the frozen line items of a sale.
    pub async fn items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, name_snapshot, quantity,
                   unit_price_cents, unit_cost_cents, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists the sales of a shift, newest first.
    pub async fn list_for_shift(&self, shift_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, business_id, shift_id, staff_id, total_cents, payment_method,
                   tendered_cents, change_cents, customer_id, sync_status, created_at
            FROM sales
            WHERE shift_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets sales still waiting for upload (push protocol), oldest first.
    pub async fn pending(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, business_id, shift_id, staff_id, total_cents, payment_method,
                   tendered_cents, change_cents, customer_id, sync_status, created_at
            FROM sales
            WHERE sync_status != ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(SyncStatus::Synced)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Marks a sale as accepted by the remote.
    pub async fn set_synced(&self, id: &str) -> DbResult<()> {
        sqlx::query("UPDATE sales SET sync_status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(SyncStatus::Synced)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
