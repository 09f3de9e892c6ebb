//! # Sale Operation
//!
//! The sale transaction - the busiest write path in the system.
//!
//! ## Transaction Scope
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      record_sale (ONE transaction)                      │
//! │                                                                         │
//! │  precondition: open shift exists for the business                       │
//! │                                                                         │
//! │  per line:                                                              │
//! │    re-read product ──► stock >= qty? ──► stock -= qty                   │
//! │         │ (current row, not the          + inventory_movements row      │
//! │         │  stale cart read)              + MOVEMENT queue entry         │
//! │         └── insufficient → ROLLBACK everything                          │
//! │                                                                         │
//! │  sale header + frozen line snapshots (name, price, cost)                │
//! │  loyalty: re-read customer, points += floor(total/10)                   │
//! │  audit row (action = SALE) + AUDIT queue entry                          │
//! │  SALE queue entry (sale + items envelope)                               │
//! │                                                                         │
//! │  COMMIT ──► notifier.notify()                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::notify::ReplicationNotifier;
use crate::ops::{OpError, OpResult};
use crate::pool::Database;
use crate::repository::{audit, customer, product, queue, sale, shift};
use caja_core::cash::{change_due_cents, points_earned};
use caja_core::queue::{CustomerSync, QueuePayload, SaleEnvelope, SyncOp};
use caja_core::validation::{validate_amount_cents, validate_quantity, validate_sale_lines};
use caja_core::{
    AuditAction, BusinessContext, CoreError, InventoryMovement, MovementReason, PaymentMethod,
    Sale, SaleItem, SyncStatus,
};

/// One cart line as handed over by the register UI.
///
/// Price and cost are NOT part of the input: they are snapshotted from the
/// current product row inside the transaction.
#[derive(Debug, Clone)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Input for [`record_sale`].
#[derive(Debug, Clone)]
pub struct SaleInput {
    pub lines: Vec<SaleLine>,
    pub payment_method: PaymentMethod,
    /// Amount handed over by the customer. Ignored for change computation
    /// on non-cash methods.
    pub tendered_cents: i64,
    /// Optional loyalty customer.
    pub customer_id: Option<String>,
}

/// Records a completed sale.
///
/// ## Preconditions
/// - An open shift exists for `ctx.business_id`
/// - Every line's product exists with sufficient CURRENT stock
/// - For cash payment, tendered covers the total
///
/// ## What Commits Together
/// Sale header, frozen line items, stock decrements, one inventory movement
/// per line, loyalty update, audit row, and the replication queue entries.
/// Any failure rolls the whole set back.
pub async fn record_sale(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    input: SaleInput,
) -> OpResult<SaleEnvelope> {
    validate_sale_lines(input.lines.len()).map_err(CoreError::from)?;
    for line in &input.lines {
        validate_quantity(line.quantity).map_err(CoreError::from)?;
    }
    validate_amount_cents("tendered", input.tendered_cents).map_err(CoreError::from)?;

    let now = Utc::now();
    let sale_id = Uuid::new_v4().to_string();

    let mut tx = db.begin().await?;

    // Sales cannot exist outside a shift.
    let open_shift = shift::find_open(&mut tx, &ctx.business_id)
        .await?
        .ok_or_else(|| CoreError::NoOpenShift(ctx.business_id.clone()))?;

    // Build line snapshots against CURRENT product rows and decrement stock.
    let mut items = Vec::with_capacity(input.lines.len());
    let mut total_cents: i64 = 0;

    for line in &input.lines {
        let p = product::get_for_update(&mut tx, &line.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        if p.stock < line.quantity {
            return Err(OpError::Core(CoreError::InsufficientStock {
                sku: p.sku,
                available: p.stock,
                requested: line.quantity,
            }));
        }

        let line_total = p.price_cents * line.quantity;
        total_cents += line_total;

        items.push(SaleItem {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.clone(),
            product_id: p.id.clone(),
            name_snapshot: p.name.clone(),
            quantity: line.quantity,
            unit_price_cents: p.price_cents,
            unit_cost_cents: p.cost_cents,
            line_total_cents: line_total,
        });

        let next_status = match p.sync_status {
            SyncStatus::PendingCreate => SyncStatus::PendingCreate,
            _ => SyncStatus::PendingUpdate,
        };
        product::adjust_stock(&mut tx, &p.id, -line.quantity, next_status, now).await?;

        let movement = InventoryMovement {
            id: Uuid::new_v4().to_string(),
            business_id: ctx.business_id.clone(),
            product_id: p.id.clone(),
            qty_change: -line.quantity,
            reason: MovementReason::Sale,
            staff_id: ctx.staff_id.clone(),
            created_at: now,
        };
        product::insert_movement(&mut tx, &movement).await?;
        queue::enqueue(&mut tx, &QueuePayload::Movement(movement)).await?;
    }

    // Cash tender must cover the total; change only exists for cash.
    let change_cents = match input.payment_method {
        PaymentMethod::Efectivo => {
            if input.tendered_cents < total_cents {
                return Err(OpError::Core(CoreError::InsufficientTender {
                    total_cents,
                    tendered_cents: input.tendered_cents,
                }));
            }
            change_due_cents(input.tendered_cents, total_cents)
        }
        _ => 0,
    };

    let sale_row = Sale {
        id: sale_id.clone(),
        business_id: ctx.business_id.clone(),
        shift_id: open_shift.id.clone(),
        staff_id: ctx.staff_id.clone(),
        total_cents,
        payment_method: input.payment_method,
        tendered_cents: input.tendered_cents,
        change_cents,
        customer_id: input.customer_id.clone(),
        sync_status: SyncStatus::PendingCreate,
        created_at: now,
    };

    sale::insert_sale(&mut tx, &sale_row).await?;
    for item in &items {
        sale::insert_sale_item(&mut tx, item).await?;
    }

    // Loyalty: award against the customer's CURRENT balance.
    if let Some(customer_id) = &input.customer_id {
        let c = customer::get_for_update(&mut tx, customer_id)
            .await?
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.clone()))?;

        let points = points_earned(total_cents);
        if points > 0 {
            customer::add_loyalty_points(&mut tx, customer_id, points, now).await?;

            let updated = caja_core::Customer {
                loyalty_points: c.loyalty_points + points,
                sync_status: SyncStatus::PendingUpdate,
                updated_at: now,
                ..c
            };
            queue::enqueue(
                &mut tx,
                &QueuePayload::CustomerSync(CustomerSync {
                    op: SyncOp::Upsert,
                    customer: updated,
                }),
            )
            .await?;
        }
    }

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::Sale,
        serde_json::json!({
            "sale_id": sale_id,
            "shift_id": open_shift.id,
            "total_cents": total_cents,
            "payment_method": input.payment_method,
            "lines": items.len(),
        }),
    )
    .await?;

    let envelope = SaleEnvelope {
        sale: sale_row,
        items,
    };
    queue::enqueue(&mut tx, &QueuePayload::Sale(envelope.clone())).await?;

    tx.commit().await?;

    info!(
        sale_id = %sale_id,
        total_cents,
        lines = envelope.items.len(),
        "Sale recorded"
    );
    debug!("Signaling replication after sale commit");
    notifier.notify();

    Ok(envelope)
}
