//! # Held Order Operations
//!
//! Parking and resuming cart snapshots. Held orders are local-only working
//! state: no audit row, no queue entry, no sync.

use chrono::Utc;
use uuid::Uuid;

use crate::ops::{OpError, OpResult};
use crate::pool::Database;
use caja_core::validation::validate_required;
use caja_core::{BusinessContext, CoreError, HeldOrder};

/// Parks the current cart under a label.
pub async fn park(
    db: &Database,
    ctx: &BusinessContext,
    label: &str,
    lines_json: &str,
) -> OpResult<HeldOrder> {
    validate_required("label", label).map_err(CoreError::from)?;

    let order = HeldOrder {
        id: Uuid::new_v4().to_string(),
        business_id: ctx.business_id.clone(),
        label: label.trim().to_string(),
        lines: lines_json.to_string(),
        created_at: Utc::now(),
    };

    db.held_orders().hold(&order).await?;
    Ok(order)
}

/// Removes a held order and returns its snapshot for the cart to resume.
pub async fn resume(db: &Database, id: &str) -> OpResult<HeldOrder> {
    let order = db
        .held_orders()
        .get(id)
        .await?
        .ok_or_else(|| OpError::Db(crate::error::DbError::not_found("HeldOrder", id)))?;

    db.held_orders().remove(id).await?;
    Ok(order)
}

/// Discards a held order without resuming it.
pub async fn discard(db: &Database, id: &str) -> OpResult<()> {
    db.held_orders().remove(id).await?;
    Ok(())
}
