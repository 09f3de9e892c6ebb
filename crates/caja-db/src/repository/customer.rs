//! # Customer Repository
//!
//! Customer and loyalty-point persistence.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use caja_core::{Customer, SyncStatus};

// =============================================================================
// Transaction-Scoped Writes
// =============================================================================

/// Inserts a customer row inside the caller's transaction.
pub async fn insert_customer(conn: &mut SqliteConnection, customer: &Customer) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO customers (
            id, business_id, name, phone, email, loyalty_points,
            deleted_at, sync_status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.business_id)
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(customer.loyalty_points)
    .bind(customer.deleted_at)
    .bind(customer.sync_status)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Updates the mutable columns of a customer row inside the caller's
/// transaction.
pub async fn update_customer_row(conn: &mut SqliteConnection, customer: &Customer) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE customers SET
            name = ?2, phone = ?3, email = ?4, loyalty_points = ?5,
            deleted_at = ?6, sync_status = ?7, updated_at = ?8
        WHERE id = ?1
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(customer.loyalty_points)
    .bind(customer.deleted_at)
    .bind(customer.sync_status)
    .bind(customer.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Re-reads an active customer inside the caller's transaction.
///
/// The sale transaction awards loyalty points against the CURRENT balance,
/// not a stale read.
pub async fn get_for_update(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, business_id, name, phone, email, loyalty_points,
               deleted_at, sync_status, created_at, updated_at
        FROM customers
        WHERE id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(customer)
}

/// Adds loyalty points to a customer inside the caller's transaction.
pub async fn add_loyalty_points(
    conn: &mut SqliteConnection,
    id: &str,
    points: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE customers SET
            loyalty_points = loyalty_points + ?2, sync_status = ?3, updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(points)
    .bind(SyncStatus::PendingUpdate)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Repository (Pool Reads + Sync-Engine Hooks)
// =============================================================================

/// Repository for customer operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID (including soft-deleted rows).
    pub async fn get(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, business_id, name, phone, email, loyalty_points,
                   deleted_at, sync_status, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists active customers for a business, name order.
    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, business_id, name, phone, email, loyalty_points,
                   deleted_at, sync_status, created_at, updated_at
            FROM customers
            WHERE business_id = ?1 AND deleted_at IS NULL
            ORDER BY name ASC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Finds an active customer by exact phone number.
    pub async fn find_by_phone(&self, business_id: &str, phone: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, business_id, name, phone, email, loyalty_points,
                   deleted_at, sync_status, created_at, updated_at
            FROM customers
            WHERE business_id = ?1 AND phone = ?2 AND deleted_at IS NULL
            "#,
        )
        .bind(business_id)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Marks a customer as accepted by the remote.
    pub async fn set_synced(&self, id: &str) -> DbResult<()> {
        sqlx::query("UPDATE customers SET sync_status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(SyncStatus::Synced)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Physically removes a customer row after a confirmed remote delete.
    pub async fn remove_row(&self, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
