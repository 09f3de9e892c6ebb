//! # Inventory Operations
//!
//! Product lifecycle and stock management.
//!
//! Every stock change pairs the `products.stock` update with an
//! inventory_movements row in the same transaction; every product mutation
//! flips the row's sync status and enqueues a PRODUCT_SYNC snapshot.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::notify::ReplicationNotifier;
use crate::ops::{OpError, OpResult};
use crate::pool::Database;
use crate::repository::{audit, product, queue};
use caja_core::queue::{ProductSync, QueuePayload, SyncOp};
use caja_core::validation::{validate_amount_cents, validate_required};
use caja_core::{
    AuditAction, BusinessContext, CoreError, InventoryMovement, MovementReason, Product,
    SyncStatus,
};

/// Input for [`create_product`].
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub initial_stock: i64,
    pub sku: String,
    pub category: Option<String>,
    pub unit: Option<String>,
}

/// Editable product fields for [`update_product`]. Stock is NOT here;
/// stock changes go through [`set_stock`] / [`adjust_stock`] so they pair
/// with a movement.
#[derive(Debug, Clone)]
pub struct ProductEdit {
    pub name: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub sku: String,
    pub category: Option<String>,
    pub unit: Option<String>,
}

/// After an edit, a row the remote has never seen stays `pending_create`;
/// anything else becomes `pending_update`.
fn escalate(status: SyncStatus) -> SyncStatus {
    match status {
        SyncStatus::PendingCreate => SyncStatus::PendingCreate,
        _ => SyncStatus::PendingUpdate,
    }
}

/// Creates a product, pairing any initial stock with an `initial` movement.
pub async fn create_product(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    input: NewProduct,
) -> OpResult<Product> {
    validate_required("name", &input.name).map_err(CoreError::from)?;
    validate_required("sku", &input.sku).map_err(CoreError::from)?;
    validate_amount_cents("price", input.price_cents).map_err(CoreError::from)?;
    validate_amount_cents("cost", input.cost_cents).map_err(CoreError::from)?;
    validate_amount_cents("initial_stock", input.initial_stock).map_err(CoreError::from)?;

    let now = Utc::now();
    let product_row = Product {
        id: Uuid::new_v4().to_string(),
        business_id: ctx.business_id.clone(),
        name: input.name,
        price_cents: input.price_cents,
        cost_cents: input.cost_cents,
        stock: input.initial_stock,
        sku: input.sku,
        category: input.category,
        unit: input.unit,
        deleted_at: None,
        sync_status: SyncStatus::PendingCreate,
        created_at: now,
        updated_at: now,
    };

    let mut tx = db.begin().await?;

    product::insert_product(&mut tx, &product_row).await?;

    if input.initial_stock != 0 {
        let movement = InventoryMovement {
            id: Uuid::new_v4().to_string(),
            business_id: ctx.business_id.clone(),
            product_id: product_row.id.clone(),
            qty_change: input.initial_stock,
            reason: MovementReason::Initial,
            staff_id: ctx.staff_id.clone(),
            created_at: now,
        };
        product::insert_movement(&mut tx, &movement).await?;
        queue::enqueue(&mut tx, &QueuePayload::Movement(movement)).await?;
    }

    queue::enqueue(
        &mut tx,
        &QueuePayload::ProductSync(ProductSync {
            op: SyncOp::Upsert,
            product: product_row.clone(),
        }),
    )
    .await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::CreateProduct,
        serde_json::json!({
            "product_id": product_row.id,
            "sku": product_row.sku,
            "initial_stock": product_row.stock,
        }),
    )
    .await?;

    tx.commit().await?;

    info!(product_id = %product_row.id, sku = %product_row.sku, "Product created");
    notifier.notify();

    Ok(product_row)
}

/// Edits a product's descriptive fields.
pub async fn update_product(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    product_id: &str,
    edit: ProductEdit,
) -> OpResult<Product> {
    validate_required("name", &edit.name).map_err(CoreError::from)?;
    validate_required("sku", &edit.sku).map_err(CoreError::from)?;
    validate_amount_cents("price", edit.price_cents).map_err(CoreError::from)?;
    validate_amount_cents("cost", edit.cost_cents).map_err(CoreError::from)?;

    let now = Utc::now();
    let mut tx = db.begin().await?;

    let existing = product::get_for_update(&mut tx, product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let updated = Product {
        name: edit.name,
        price_cents: edit.price_cents,
        cost_cents: edit.cost_cents,
        sku: edit.sku,
        category: edit.category,
        unit: edit.unit,
        sync_status: escalate(existing.sync_status),
        updated_at: now,
        ..existing
    };

    product::update_product_row(&mut tx, &updated).await?;

    queue::enqueue(
        &mut tx,
        &QueuePayload::ProductSync(ProductSync {
            op: SyncOp::Upsert,
            product: updated.clone(),
        }),
    )
    .await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::UpdateProduct,
        serde_json::json!({ "product_id": product_id, "sku": updated.sku }),
    )
    .await?;

    tx.commit().await?;

    notifier.notify();
    Ok(updated)
}

/// Sets an absolute stock level (manual correction).
pub async fn set_stock(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    product_id: &str,
    new_stock: i64,
) -> OpResult<Product> {
    validate_amount_cents("stock", new_stock).map_err(CoreError::from)?;

    let now = Utc::now();
    let mut tx = db.begin().await?;

    let existing = product::get_for_update(&mut tx, product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let delta = new_stock - existing.stock;
    let next_status = escalate(existing.sync_status);

    product::set_stock(&mut tx, product_id, new_stock, next_status, now).await?;

    if delta != 0 {
        let movement = InventoryMovement {
            id: Uuid::new_v4().to_string(),
            business_id: ctx.business_id.clone(),
            product_id: product_id.to_string(),
            qty_change: delta,
            reason: MovementReason::Correction,
            staff_id: ctx.staff_id.clone(),
            created_at: now,
        };
        product::insert_movement(&mut tx, &movement).await?;
        queue::enqueue(&mut tx, &QueuePayload::Movement(movement)).await?;
    }

    let updated = Product {
        stock: new_stock,
        sync_status: next_status,
        updated_at: now,
        ..existing
    };

    queue::enqueue(
        &mut tx,
        &QueuePayload::ProductSync(ProductSync {
            op: SyncOp::Upsert,
            product: updated.clone(),
        }),
    )
    .await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::UpdateStock,
        serde_json::json!({
            "product_id": product_id,
            "old_stock": existing.stock,
            "new_stock": new_stock,
        }),
    )
    .await?;

    tx.commit().await?;

    notifier.notify();
    Ok(updated)
}

/// Applies a signed stock delta with an explicit reason
/// (restock / return / damage).
pub async fn adjust_stock(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    product_id: &str,
    delta: i64,
    reason: MovementReason,
) -> OpResult<Product> {
    let now = Utc::now();
    let mut tx = db.begin().await?;

    let existing = product::get_for_update(&mut tx, product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let new_stock = existing.stock + delta;
    if new_stock < 0 {
        return Err(OpError::Core(CoreError::InsufficientStock {
            sku: existing.sku,
            available: existing.stock,
            requested: -delta,
        }));
    }

    let next_status = escalate(existing.sync_status);
    product::adjust_stock(&mut tx, product_id, delta, next_status, now).await?;

    let movement = InventoryMovement {
        id: Uuid::new_v4().to_string(),
        business_id: ctx.business_id.clone(),
        product_id: product_id.to_string(),
        qty_change: delta,
        reason,
        staff_id: ctx.staff_id.clone(),
        created_at: now,
    };
    product::insert_movement(&mut tx, &movement).await?;
    queue::enqueue(&mut tx, &QueuePayload::Movement(movement)).await?;

    let updated = Product {
        stock: new_stock,
        sync_status: next_status,
        updated_at: now,
        ..existing
    };

    queue::enqueue(
        &mut tx,
        &QueuePayload::ProductSync(ProductSync {
            op: SyncOp::Upsert,
            product: updated.clone(),
        }),
    )
    .await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::UpdateStock,
        serde_json::json!({
            "product_id": product_id,
            "delta": delta,
            "reason": reason,
            "new_stock": new_stock,
        }),
    )
    .await?;

    tx.commit().await?;

    notifier.notify();
    Ok(updated)
}

/// Soft-deletes a product.
///
/// The row stays (tagged `pending_delete`) until the remote confirms the
/// delete; only then does the push protocol remove it physically. Movement
/// and sale-item history survives either way.
pub async fn delete_product(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    product_id: &str,
) -> OpResult<()> {
    let now = Utc::now();
    let mut tx = db.begin().await?;

    let existing = product::get_for_update(&mut tx, product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let deleted = Product {
        deleted_at: Some(now),
        sync_status: SyncStatus::PendingDelete,
        updated_at: now,
        ..existing
    };

    product::update_product_row(&mut tx, &deleted).await?;

    queue::enqueue(
        &mut tx,
        &QueuePayload::ProductSync(ProductSync {
            op: SyncOp::Delete,
            product: deleted.clone(),
        }),
    )
    .await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::DeleteProduct,
        serde_json::json!({ "product_id": product_id, "sku": deleted.sku }),
    )
    .await?;

    tx.commit().await?;

    info!(product_id = %product_id, "Product soft-deleted, pending remote confirmation");
    notifier.notify();
    Ok(())
}
