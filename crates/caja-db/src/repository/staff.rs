//! # Staff Repository
//!
//! Staff members and PIN lookup for the login screen.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use caja_core::Staff;

/// Inserts a staff row inside the caller's transaction.
pub async fn insert_staff(conn: &mut SqliteConnection, staff: &Staff) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO staff (id, business_id, name, pin, role, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&staff.id)
    .bind(&staff.business_id)
    .bind(&staff.name)
    .bind(&staff.pin)
    .bind(&staff.role)
    .bind(staff.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Repository for staff reads.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Lists staff of a business, name order.
    pub async fn list(&self, business_id: &str) -> DbResult<Vec<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(
            r#"
            SELECT id, business_id, name, pin, role, created_at
            FROM staff
            WHERE business_id = ?1
            ORDER BY name ASC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(staff)
    }

    /// Finds the staff member matching a PIN, if any.
    pub async fn find_by_pin(&self, business_id: &str, pin: &str) -> DbResult<Option<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(
            r#"
            SELECT id, business_id, name, pin, role, created_at
            FROM staff
            WHERE business_id = ?1 AND pin = ?2
            "#,
        )
        .bind(business_id)
        .bind(pin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(staff)
    }
}
