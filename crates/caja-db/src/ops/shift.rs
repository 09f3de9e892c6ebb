//! # Shift Operations
//!
//! Cash shift lifecycle and manual drawer movements.
//!
//! ## Reconciliation Math (integer cents throughout)
//! ```text
//! expected   = start_amount + cash_sales + cash_in - cash_out
//! difference = counted - expected        (negative = drawer short)
//! ```
//! Card and transfer sales never touch the drawer and are excluded from
//! `cash_sales`.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::notify::ReplicationNotifier;
use crate::ops::OpResult;
use crate::pool::Database;
use crate::repository::{audit, queue, sale, shift};
use caja_core::cash::{close_difference_cents, expected_cash_cents};
use caja_core::queue::QueuePayload;
use caja_core::validation::{validate_amount_cents, validate_positive_cents, validate_required};
use caja_core::{
    AuditAction, BusinessContext, CashMovement, CashMovementKind, CashShift, CoreError,
    ShiftStatus, SyncStatus,
};

/// Opens a cash shift with a counted drawer float.
///
/// ## Preconditions
/// No open shift may exist for the business (singleton invariant, checked
/// inside the transaction).
pub async fn open_shift(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    start_amount_cents: i64,
) -> OpResult<CashShift> {
    validate_amount_cents("start_amount", start_amount_cents).map_err(CoreError::from)?;

    let now = Utc::now();
    let mut tx = db.begin().await?;

    if let Some(existing) = shift::find_open(&mut tx, &ctx.business_id).await? {
        return Err(CoreError::ShiftAlreadyOpen {
            shift_id: existing.id,
        }
        .into());
    }

    let shift_row = CashShift {
        id: Uuid::new_v4().to_string(),
        business_id: ctx.business_id.clone(),
        opened_by: ctx.staff_id.clone(),
        start_amount_cents,
        opened_at: now,
        status: ShiftStatus::Open,
        end_amount_cents: None,
        expected_cents: None,
        difference_cents: None,
        closed_at: None,
        sync_status: SyncStatus::PendingCreate,
    };

    shift::insert_shift(&mut tx, &shift_row).await?;
    queue::enqueue(&mut tx, &QueuePayload::Shift(shift_row.clone())).await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::OpenShift,
        serde_json::json!({
            "shift_id": shift_row.id,
            "start_amount_cents": start_amount_cents,
        }),
    )
    .await?;

    tx.commit().await?;

    info!(shift_id = %shift_row.id, start_amount_cents, "Shift opened");
    notifier.notify();
    Ok(shift_row)
}

/// Closes the open shift against a counted drawer amount.
///
/// Expected cash and the signed difference are computed inside the close
/// transaction from the shift's live sales and movements. `closed` is
/// terminal.
pub async fn close_shift(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    counted_cents: i64,
) -> OpResult<CashShift> {
    validate_amount_cents("counted_amount", counted_cents).map_err(CoreError::from)?;

    let now = Utc::now();
    let mut tx = db.begin().await?;

    let open = shift::find_open(&mut tx, &ctx.business_id)
        .await?
        .ok_or_else(|| CoreError::NoOpenShift(ctx.business_id.clone()))?;

    let cash_sales = sale::sum_cash_sales(&mut tx, &open.id).await?;
    let cash_in = shift::sum_cash_movements(&mut tx, &open.id, CashMovementKind::In).await?;
    let cash_out = shift::sum_cash_movements(&mut tx, &open.id, CashMovementKind::Out).await?;

    let expected = expected_cash_cents(open.start_amount_cents, cash_sales, cash_in, cash_out);
    let difference = close_difference_cents(counted_cents, expected);

    shift::close_shift_row(&mut tx, &open.id, counted_cents, expected, difference, now).await?;

    let closed = CashShift {
        status: ShiftStatus::Closed,
        end_amount_cents: Some(counted_cents),
        expected_cents: Some(expected),
        difference_cents: Some(difference),
        closed_at: Some(now),
        sync_status: SyncStatus::PendingUpdate,
        ..open
    };

    queue::enqueue(&mut tx, &QueuePayload::Shift(closed.clone())).await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::CloseShift,
        serde_json::json!({
            "shift_id": closed.id,
            "expected_cents": expected,
            "counted_cents": counted_cents,
            "difference_cents": difference,
        }),
    )
    .await?;

    tx.commit().await?;

    info!(
        shift_id = %closed.id,
        expected_cents = expected,
        difference_cents = difference,
        "Shift closed"
    );
    notifier.notify();
    Ok(closed)
}

/// Records money added to the drawer outside a sale.
pub async fn cash_in(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    amount_cents: i64,
    reason: &str,
) -> OpResult<CashMovement> {
    record_cash_movement(
        db,
        notifier,
        ctx,
        CashMovementKind::In,
        amount_cents,
        reason,
    )
    .await
}

/// Records money removed from the drawer outside a sale.
pub async fn cash_out(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    amount_cents: i64,
    reason: &str,
) -> OpResult<CashMovement> {
    record_cash_movement(
        db,
        notifier,
        ctx,
        CashMovementKind::Out,
        amount_cents,
        reason,
    )
    .await
}

async fn record_cash_movement(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    kind: CashMovementKind,
    amount_cents: i64,
    reason: &str,
) -> OpResult<CashMovement> {
    validate_positive_cents("amount", amount_cents).map_err(CoreError::from)?;
    validate_required("reason", reason).map_err(CoreError::from)?;

    let now = Utc::now();
    let mut tx = db.begin().await?;

    let open = shift::find_open(&mut tx, &ctx.business_id)
        .await?
        .ok_or_else(|| CoreError::NoOpenShift(ctx.business_id.clone()))?;

    let movement = CashMovement {
        id: Uuid::new_v4().to_string(),
        business_id: ctx.business_id.clone(),
        shift_id: open.id.clone(),
        kind,
        amount_cents,
        reason: reason.trim().to_string(),
        staff_id: ctx.staff_id.clone(),
        created_at: now,
    };

    shift::insert_cash_movement(&mut tx, &movement).await?;
    queue::enqueue(&mut tx, &QueuePayload::CashMovement(movement.clone())).await?;

    let action = match kind {
        CashMovementKind::In => AuditAction::CashIn,
        CashMovementKind::Out => AuditAction::CashOut,
    };
    audit::log_action(
        &mut tx,
        ctx,
        action,
        serde_json::json!({
            "shift_id": movement.shift_id,
            "amount_cents": amount_cents,
            "reason": movement.reason,
        }),
    )
    .await?;

    tx.commit().await?;

    notifier.notify();
    Ok(movement)
}
