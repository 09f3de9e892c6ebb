//! # Held Order Repository
//!
//! Parked cart snapshots. Local-only: held orders never enter the action
//! queue and never replicate.

use sqlx::SqlitePool;

use crate::error::DbResult;
use caja_core::HeldOrder;

/// Repository for held orders.
#[derive(Debug, Clone)]
pub struct HeldOrderRepository {
    pool: SqlitePool,
}

impl HeldOrderRepository {
    /// Creates a new HeldOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        HeldOrderRepository { pool }
    }

    /// Parks a cart snapshot.
    pub async fn hold(&self, order: &HeldOrder) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO held_orders (id, business_id, label, lines, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&order.id)
        .bind(&order.business_id)
        .bind(&order.label)
        .bind(&order.lines)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists held orders for a business, oldest first.
    pub async fn list(&self, business_id: &str) -> DbResult<Vec<HeldOrder>> {
        let orders = sqlx::query_as::<_, HeldOrder>(
            r#"
            SELECT id, business_id, label, lines, created_at
            FROM held_orders
            WHERE business_id = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Retrieves a held order by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<HeldOrder>> {
        let order = sqlx::query_as::<_, HeldOrder>(
            r#"
            SELECT id, business_id, label, lines, created_at
            FROM held_orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Removes a held order (resumed into the cart or abandoned).
    pub async fn remove(&self, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM held_orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
