//! # Product Repository
//!
//! Product catalog access plus the append-only inventory movement ledger.
//!
//! ## Stock Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products.stock is derived-but-stored: every change to it is written    │
//! │  together with an inventory_movements row in the SAME transaction.      │
//! │                                                                         │
//! │  ops/sale.rs      : stock -= qty   + movement(reason='sale')            │
//! │  ops/inventory.rs : stock = n      + movement(reason='correction')      │
//! │                     stock += delta + movement(reason='restock'/...)     │
//! │                                                                         │
//! │  The tx-scoped functions below never commit; ops/ owns the commit.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use caja_core::{InventoryMovement, Product, SyncStatus};

// =============================================================================
// Transaction-Scoped Writes
// =============================================================================

/// Inserts a full product row inside the caller's transaction.
pub async fn insert_product(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO products (
            id, business_id, name, price_cents, cost_cents, stock,
            sku, category, unit, deleted_at, sync_status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&product.id)
    .bind(&product.business_id)
    .bind(&product.name)
    .bind(product.price_cents)
    .bind(product.cost_cents)
    .bind(product.stock)
    .bind(&product.sku)
    .bind(&product.category)
    .bind(&product.unit)
    .bind(product.deleted_at)
    .bind(product.sync_status)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Updates the mutable columns of a product row inside the caller's
/// transaction. Stock is NOT touched here; use [`adjust_stock`] /
/// [`set_stock`] so the movement ledger stays consistent.
pub async fn update_product_row(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE products SET
            name = ?2, price_cents = ?3, cost_cents = ?4, sku = ?5,
            category = ?6, unit = ?7, deleted_at = ?8,
            sync_status = ?9, updated_at = ?10
        WHERE id = ?1
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.price_cents)
    .bind(product.cost_cents)
    .bind(&product.sku)
    .bind(&product.category)
    .bind(&product.unit)
    .bind(product.deleted_at)
    .bind(product.sync_status)
    .bind(product.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Re-reads a product inside the caller's transaction.
///
/// ## When This Occurs
/// The sale transaction validates stock against the CURRENT row, not against
/// whatever the cart UI read seconds earlier.
pub async fn get_for_update(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, business_id, name, price_cents, cost_cents, stock,
               sku, category, unit, deleted_at, sync_status, created_at, updated_at
        FROM products
        WHERE id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

/// Applies a signed stock delta and flips the sync status, inside the
/// caller's transaction.
pub async fn adjust_stock(
    conn: &mut SqliteConnection,
    id: &str,
    delta: i64,
    sync_status: SyncStatus,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE products SET stock = stock + ?2, sync_status = ?3, updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(delta)
    .bind(sync_status)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Sets an absolute stock level (manual correction), inside the caller's
/// transaction.
pub async fn set_stock(
    conn: &mut SqliteConnection,
    id: &str,
    stock: i64,
    sync_status: SyncStatus,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE products SET stock = ?2, sync_status = ?3, updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(stock)
    .bind(sync_status)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Appends an inventory movement row inside the caller's transaction.
pub async fn insert_movement(
    conn: &mut SqliteConnection,
    movement: &InventoryMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_movements (
            id, business_id, product_id, qty_change, reason, staff_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.business_id)
    .bind(&movement.product_id)
    .bind(movement.qty_change)
    .bind(movement.reason)
    .bind(&movement.staff_id)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Repository (Pool Reads + Sync-Engine Hooks)
// =============================================================================

/// Repository for product operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID (including soft-deleted rows).
    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, business_id, name, price_cents, cost_cents, stock,
                   sku, category, unit, deleted_at, sync_status, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active (non-deleted) products for a business, name order.
    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, business_id, name, price_cents, cost_cents, stock,
                   sku, category, unit, deleted_at, sync_status, created_at, updated_at
            FROM products
            WHERE business_id = ?1 AND deleted_at IS NULL
            ORDER BY name ASC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches active products by name or SKU substring.
    pub async fn search(&self, business_id: &str, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let pattern = format!("%{}%", query);

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, business_id, name, price_cents, cost_cents, stock,
                   sku, category, unit, deleted_at, sync_status, created_at, updated_at
            FROM products
            WHERE business_id = ?1 AND deleted_at IS NULL
              AND (name LIKE ?2 OR sku LIKE ?2)
            ORDER BY name ASC
            LIMIT ?3
            "#,
        )
        .bind(business_id)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Finds an active product by exact SKU (barcode scan path).
    pub async fn find_by_sku(&self, business_id: &str, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, business_id, name, price_cents, cost_cents, stock,
                   sku, category, unit, deleted_at, sync_status, created_at, updated_at
            FROM products
            WHERE business_id = ?1 AND sku = ?2 AND deleted_at IS NULL
            "#,
        )
        .bind(business_id)
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets products in a given sync state (push protocol phases).
    ///
    /// Soft-deleted rows are included: `pending_delete` lives on rows with
    /// `deleted_at` set.
    pub async fn by_sync_status(&self, status: SyncStatus) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, business_id, name, price_cents, cost_cents, stock,
                   sku, category, unit, deleted_at, sync_status, created_at, updated_at
            FROM products
            WHERE sync_status = ?1
            ORDER BY updated_at ASC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Marks a product as accepted by the remote.
    pub async fn set_synced(&self, id: &str) -> DbResult<()> {
        sqlx::query("UPDATE products SET sync_status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(SyncStatus::Synced)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Physically removes a product row after a confirmed remote delete.
    ///
    /// Movement and sale-item history deliberately survives (no FK).
    pub async fn remove_row(&self, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Overwrite-merges the remote catalog into the local store (pull).
    ///
    /// ## Conflict Policy
    /// Remote wins (last-write-wins): each incoming row replaces the local
    /// one wholesale and is marked `synced`. Rows with local pending edits
    /// are NOT protected; an edit that has not pushed yet can be clobbered
    /// by a pull. Accepted tradeoff for a single-register deployment.
    pub async fn replace_from_remote(&self, products: &[Product]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;

        for product in products {
            sqlx::query(
                r#"
                INSERT INTO products (
                    id, business_id, name, price_cents, cost_cents, stock,
                    sku, category, unit, deleted_at, sync_status, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ON CONFLICT (id) DO UPDATE SET
                    name = excluded.name,
                    price_cents = excluded.price_cents,
                    cost_cents = excluded.cost_cents,
                    stock = excluded.stock,
                    sku = excluded.sku,
                    category = excluded.category,
                    unit = excluded.unit,
                    deleted_at = excluded.deleted_at,
                    sync_status = excluded.sync_status,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(&product.id)
            .bind(&product.business_id)
            .bind(&product.name)
            .bind(product.price_cents)
            .bind(product.cost_cents)
            .bind(product.stock)
            .bind(&product.sku)
            .bind(&product.category)
            .bind(&product.unit)
            .bind(product.deleted_at)
            .bind(SyncStatus::Synced)
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(count = products.len(), "Merged remote products");
        Ok(products.len())
    }

    /// Recent movement history for a product (newest first).
    pub async fn movements(&self, product_id: &str, limit: u32) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(
            r#"
            SELECT id, business_id, product_id, qty_change, reason, staff_id, created_at
            FROM inventory_movements
            WHERE product_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}
