//! # Customer Operations
//!
//! Customer lifecycle. Loyalty points are awarded by the sale transaction;
//! here they change only through an explicit edit.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::notify::ReplicationNotifier;
use crate::ops::OpResult;
use crate::pool::Database;
use crate::repository::{audit, customer, queue};
use caja_core::queue::{CustomerSync, QueuePayload, SyncOp};
use caja_core::validation::{validate_amount_cents, validate_phone, validate_required};
use caja_core::{AuditAction, BusinessContext, CoreError, Customer, SyncStatus};

/// Input for [`create_customer`].
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Editable customer fields for [`update_customer`].
#[derive(Debug, Clone)]
pub struct CustomerEdit {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub loyalty_points: i64,
}

fn escalate(status: SyncStatus) -> SyncStatus {
    match status {
        SyncStatus::PendingCreate => SyncStatus::PendingCreate,
        _ => SyncStatus::PendingUpdate,
    }
}

/// Creates a customer.
pub async fn create_customer(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    input: NewCustomer,
) -> OpResult<Customer> {
    validate_required("name", &input.name).map_err(CoreError::from)?;
    if let Some(phone) = &input.phone {
        validate_phone(phone).map_err(CoreError::from)?;
    }

    let now = Utc::now();
    let customer_row = Customer {
        id: Uuid::new_v4().to_string(),
        business_id: ctx.business_id.clone(),
        name: input.name,
        phone: input.phone,
        email: input.email,
        loyalty_points: 0,
        deleted_at: None,
        sync_status: SyncStatus::PendingCreate,
        created_at: now,
        updated_at: now,
    };

    let mut tx = db.begin().await?;

    customer::insert_customer(&mut tx, &customer_row).await?;
    queue::enqueue(
        &mut tx,
        &QueuePayload::CustomerSync(CustomerSync {
            op: SyncOp::Upsert,
            customer: customer_row.clone(),
        }),
    )
    .await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::CreateCustomer,
        serde_json::json!({ "customer_id": customer_row.id, "name": customer_row.name }),
    )
    .await?;

    tx.commit().await?;

    notifier.notify();
    Ok(customer_row)
}

/// Edits a customer, including manual loyalty adjustment.
pub async fn update_customer(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    customer_id: &str,
    edit: CustomerEdit,
) -> OpResult<Customer> {
    validate_required("name", &edit.name).map_err(CoreError::from)?;
    if let Some(phone) = &edit.phone {
        validate_phone(phone).map_err(CoreError::from)?;
    }
    validate_amount_cents("loyalty_points", edit.loyalty_points).map_err(CoreError::from)?;

    let now = Utc::now();
    let mut tx = db.begin().await?;

    let existing = customer::get_for_update(&mut tx, customer_id)
        .await?
        .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;

    let updated = Customer {
        name: edit.name,
        phone: edit.phone,
        email: edit.email,
        loyalty_points: edit.loyalty_points,
        sync_status: escalate(existing.sync_status),
        updated_at: now,
        ..existing
    };

    customer::update_customer_row(&mut tx, &updated).await?;
    queue::enqueue(
        &mut tx,
        &QueuePayload::CustomerSync(CustomerSync {
            op: SyncOp::Upsert,
            customer: updated.clone(),
        }),
    )
    .await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::UpdateCustomer,
        serde_json::json!({ "customer_id": customer_id }),
    )
    .await?;

    tx.commit().await?;

    notifier.notify();
    Ok(updated)
}

/// Soft-deletes a customer; the row stays until the remote confirms.
pub async fn delete_customer(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    customer_id: &str,
) -> OpResult<()> {
    let now = Utc::now();
    let mut tx = db.begin().await?;

    let existing = customer::get_for_update(&mut tx, customer_id)
        .await?
        .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;

    let deleted = Customer {
        deleted_at: Some(now),
        sync_status: SyncStatus::PendingDelete,
        updated_at: now,
        ..existing
    };

    customer::update_customer_row(&mut tx, &deleted).await?;
    queue::enqueue(
        &mut tx,
        &QueuePayload::CustomerSync(CustomerSync {
            op: SyncOp::Delete,
            customer: deleted.clone(),
        }),
    )
    .await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::DeleteCustomer,
        serde_json::json!({ "customer_id": customer_id }),
    )
    .await?;

    tx.commit().await?;

    info!(customer_id = %customer_id, "Customer soft-deleted, pending remote confirmation");
    notifier.notify();
    Ok(())
}
