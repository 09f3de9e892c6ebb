//! Integration tests for the domain transaction wrappers, run against an
//! in-memory SQLite store.

use caja_core::queue::QueuePayload;
use caja_core::{
    AuditAction, BusinessContext, CoreError, MovementReason, PaymentMethod, QueueKind, SyncStatus,
};
use caja_db::ops::customer::NewCustomer;
use caja_db::ops::inventory::{NewProduct, ProductEdit};
use caja_db::ops::sale::{SaleInput, SaleLine};
use caja_db::ops::{customer as customer_ops, inventory, sale as sale_ops, shift as shift_ops};
use caja_db::ops::{held_order, OpError};
use caja_db::{Database, DbConfig, ReplicationNotifier};

const BIZ: &str = "biz-1";

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn ctx() -> BusinessContext {
    BusinessContext::staff(BIZ, "staff-1", "Ana")
}

async fn seed_product(db: &Database, name: &str, sku: &str, price: i64, stock: i64) -> String {
    let product = inventory::create_product(
        db,
        &ReplicationNotifier::disabled(),
        &ctx(),
        NewProduct {
            name: name.to_string(),
            price_cents: price,
            cost_cents: price / 2,
            initial_stock: stock,
            sku: sku.to_string(),
            category: None,
            unit: None,
        },
    )
    .await
    .unwrap();
    product.id
}

async fn open_shift(db: &Database, start_cents: i64) -> String {
    shift_ops::open_shift(db, &ReplicationNotifier::disabled(), &ctx(), start_cents)
        .await
        .unwrap()
        .id
}

async fn queue_kinds(db: &Database) -> Vec<QueueKind> {
    db.queue()
        .pending(100)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.kind)
        .collect()
}

// =============================================================================
// Sale Transaction
// =============================================================================

#[tokio::test]
async fn sale_commits_all_side_effects_atomically() {
    let db = test_db().await;
    let notifier = ReplicationNotifier::disabled();
    let product_id = seed_product(&db, "Coca-Cola 600ml", "COCA-600", 1_900, 10).await;
    open_shift(&db, 50_000).await;

    let envelope = sale_ops::record_sale(
        &db,
        &notifier,
        &ctx(),
        SaleInput {
            lines: vec![SaleLine {
                product_id: product_id.clone(),
                quantity: 2,
            }],
            payment_method: PaymentMethod::Efectivo,
            tendered_cents: 5_000,
            customer_id: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(envelope.sale.total_cents, 3_800);
    assert_eq!(envelope.sale.change_cents, 1_200);
    assert_eq!(envelope.sale.sync_status, SyncStatus::PendingCreate);
    assert_eq!(envelope.items.len(), 1);
    assert_eq!(envelope.items[0].name_snapshot, "Coca-Cola 600ml");

    // Stock decremented and movement paired.
    let product = db.products().get(&product_id).await.unwrap().unwrap();
    assert_eq!(product.stock, 8);

    let movements = db.products().movements(&product_id, 10).await.unwrap();
    let sale_mv = movements
        .iter()
        .find(|m| m.reason == MovementReason::Sale)
        .unwrap();
    assert_eq!(sale_mv.qty_change, -2);

    // Durable items rows.
    let items = db.sales().items(&envelope.sale.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].line_total_cents, 3_800);

    // Queue carries the SALE envelope + the line movement + the audit entry.
    let kinds = queue_kinds(&db).await;
    assert!(kinds.contains(&QueueKind::Sale));
    assert!(kinds.contains(&QueueKind::Movement));
    assert!(kinds.contains(&QueueKind::Audit));

    // Audit row written in the same commit.
    let audit = db.audit().recent(BIZ, 10).await.unwrap();
    assert!(audit.iter().any(|a| a.action == AuditAction::Sale));
}

#[tokio::test]
async fn sale_rolls_back_entirely_on_insufficient_stock() {
    let db = test_db().await;
    let notifier = ReplicationNotifier::disabled();
    let plenty = seed_product(&db, "Agua 1L", "AGUA-1L", 1_200, 10).await;
    let scarce = seed_product(&db, "Chicle", "CHICLE", 500, 1).await;
    open_shift(&db, 0).await;

    let queued_before = db.queue().count().await.unwrap();

    let err = sale_ops::record_sale(
        &db,
        &notifier,
        &ctx(),
        SaleInput {
            lines: vec![
                SaleLine {
                    product_id: plenty.clone(),
                    quantity: 3,
                },
                SaleLine {
                    product_id: scarce.clone(),
                    quantity: 2,
                },
            ],
            payment_method: PaymentMethod::Efectivo,
            tendered_cents: 10_000,
            customer_id: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        OpError::Core(CoreError::InsufficientStock { available: 1, requested: 2, .. })
    ));

    // The first line's decrement rolled back too.
    let p = db.products().get(&plenty).await.unwrap().unwrap();
    assert_eq!(p.stock, 10);

    // No sale, no queue growth.
    assert!(db.sales().pending().await.unwrap().is_empty());
    assert_eq!(db.queue().count().await.unwrap(), queued_before);
}

#[tokio::test]
async fn sale_requires_open_shift() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Pan", "PAN", 800, 5).await;

    let err = sale_ops::record_sale(
        &db,
        &ReplicationNotifier::disabled(),
        &ctx(),
        SaleInput {
            lines: vec![SaleLine {
                product_id,
                quantity: 1,
            }],
            payment_method: PaymentMethod::Efectivo,
            tendered_cents: 800,
            customer_id: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, OpError::Core(CoreError::NoOpenShift(_))));
}

#[tokio::test]
async fn cash_sale_rejects_insufficient_tender() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Queso", "QUESO", 4_000, 5).await;
    open_shift(&db, 0).await;

    let err = sale_ops::record_sale(
        &db,
        &ReplicationNotifier::disabled(),
        &ctx(),
        SaleInput {
            lines: vec![SaleLine {
                product_id: product_id.clone(),
                quantity: 1,
            }],
            payment_method: PaymentMethod::Efectivo,
            tendered_cents: 3_000,
            customer_id: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        OpError::Core(CoreError::InsufficientTender {
            total_cents: 4_000,
            tendered_cents: 3_000
        })
    ));

    let p = db.products().get(&product_id).await.unwrap().unwrap();
    assert_eq!(p.stock, 5);
}

#[tokio::test]
async fn sale_awards_loyalty_points_from_current_balance() {
    let db = test_db().await;
    let notifier = ReplicationNotifier::disabled();
    let product_id = seed_product(&db, "Carne 1kg", "CARNE", 12_000, 10).await;
    open_shift(&db, 0).await;

    let customer = customer_ops::create_customer(
        &db,
        &notifier,
        &ctx(),
        NewCustomer {
            name: "Luis".to_string(),
            phone: Some("555-000-1111".to_string()),
            email: None,
        },
    )
    .await
    .unwrap();

    sale_ops::record_sale(
        &db,
        &notifier,
        &ctx(),
        SaleInput {
            lines: vec![SaleLine {
                product_id,
                quantity: 1,
            }],
            payment_method: PaymentMethod::Tarjeta,
            tendered_cents: 12_000,
            customer_id: Some(customer.id.clone()),
        },
    )
    .await
    .unwrap();

    // floor(12000 / 1000) = 12 points
    let c = db.customers().get(&customer.id).await.unwrap().unwrap();
    assert_eq!(c.loyalty_points, 12);
    assert_eq!(c.sync_status, SyncStatus::PendingUpdate);
}

// =============================================================================
// Shift Lifecycle
// =============================================================================

#[tokio::test]
async fn at_most_one_open_shift_per_business() {
    let db = test_db().await;
    let notifier = ReplicationNotifier::disabled();
    open_shift(&db, 10_000).await;

    let err = shift_ops::open_shift(&db, &notifier, &ctx(), 5_000)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OpError::Core(CoreError::ShiftAlreadyOpen { .. })
    ));

    // Closing makes room for a new shift.
    shift_ops::close_shift(&db, &notifier, &ctx(), 10_000)
        .await
        .unwrap();
    shift_ops::open_shift(&db, &notifier, &ctx(), 5_000)
        .await
        .unwrap();
}

#[tokio::test]
async fn close_shift_reconciles_cash_in_integer_cents() {
    let db = test_db().await;
    let notifier = ReplicationNotifier::disabled();
    let product_id = seed_product(&db, "Despensa", "DESP", 23_750, 10).await;
    open_shift(&db, 50_000).await;

    // Cash sale of 237.50, plus manual drawer movements.
    sale_ops::record_sale(
        &db,
        &notifier,
        &ctx(),
        SaleInput {
            lines: vec![SaleLine {
                product_id,
                quantity: 1,
            }],
            payment_method: PaymentMethod::Efectivo,
            tendered_cents: 23_750,
            customer_id: None,
        },
    )
    .await
    .unwrap();
    shift_ops::cash_in(&db, &notifier, &ctx(), 5_000, "cambio extra")
        .await
        .unwrap();
    shift_ops::cash_out(&db, &notifier, &ctx(), 2_000, "proveedor")
        .await
        .unwrap();

    let closed = shift_ops::close_shift(&db, &notifier, &ctx(), 76_000)
        .await
        .unwrap();

    assert_eq!(closed.expected_cents, Some(76_750));
    assert_eq!(closed.difference_cents, Some(-750)); // drawer short
    assert_eq!(closed.end_amount_cents, Some(76_000));
    assert!(closed.closed_at.is_some());
    assert_eq!(closed.sync_status, SyncStatus::PendingUpdate);
}

#[tokio::test]
async fn card_sales_do_not_count_toward_drawer_cash() {
    let db = test_db().await;
    let notifier = ReplicationNotifier::disabled();
    let product_id = seed_product(&db, "Vino", "VINO", 30_000, 5).await;
    open_shift(&db, 10_000).await;

    sale_ops::record_sale(
        &db,
        &notifier,
        &ctx(),
        SaleInput {
            lines: vec![SaleLine {
                product_id,
                quantity: 1,
            }],
            payment_method: PaymentMethod::Tarjeta,
            tendered_cents: 30_000,
            customer_id: None,
        },
    )
    .await
    .unwrap();

    let closed = shift_ops::close_shift(&db, &notifier, &ctx(), 10_000)
        .await
        .unwrap();
    assert_eq!(closed.expected_cents, Some(10_000));
    assert_eq!(closed.difference_cents, Some(0));
}

#[tokio::test]
async fn cash_movement_requires_open_shift_and_valid_input() {
    let db = test_db().await;
    let notifier = ReplicationNotifier::disabled();

    let err = shift_ops::cash_in(&db, &notifier, &ctx(), 1_000, "fondo")
        .await
        .unwrap_err();
    assert!(matches!(err, OpError::Core(CoreError::NoOpenShift(_))));

    open_shift(&db, 0).await;

    assert!(shift_ops::cash_out(&db, &notifier, &ctx(), 0, "nada")
        .await
        .is_err());
    assert!(shift_ops::cash_out(&db, &notifier, &ctx(), 500, "   ")
        .await
        .is_err());
}

// =============================================================================
// Product Lifecycle (edit / delete sync states)
// =============================================================================

#[tokio::test]
async fn product_edits_flip_sync_status() {
    let db = test_db().await;
    let notifier = ReplicationNotifier::disabled();
    let product_id = seed_product(&db, "Cafe", "CAFE", 9_000, 4).await;

    // Never uploaded yet: stays pending_create after an edit.
    let edited = inventory::update_product(
        &db,
        &notifier,
        &ctx(),
        &product_id,
        ProductEdit {
            name: "Cafe de olla".to_string(),
            price_cents: 9_500,
            cost_cents: 4_000,
            sku: "CAFE".to_string(),
            category: None,
            unit: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(edited.sync_status, SyncStatus::PendingCreate);

    // Simulate a completed upload, then edit again.
    db.products().set_synced(&product_id).await.unwrap();
    let edited = inventory::set_stock(&db, &notifier, &ctx(), &product_id, 20)
        .await
        .unwrap();
    assert_eq!(edited.sync_status, SyncStatus::PendingUpdate);

    // Correction movement paired with the absolute set.
    let movements = db.products().movements(&product_id, 10).await.unwrap();
    let correction = movements
        .iter()
        .find(|m| m.reason == MovementReason::Correction)
        .unwrap();
    assert_eq!(correction.qty_change, 16);

    // Delete soft-deletes and tags pending_delete.
    inventory::delete_product(&db, &notifier, &ctx(), &product_id)
        .await
        .unwrap();
    let p = db.products().get(&product_id).await.unwrap().unwrap();
    assert!(p.deleted_at.is_some());
    assert_eq!(p.sync_status, SyncStatus::PendingDelete);

    // Deleted product no longer sellable.
    open_shift(&db, 0).await;
    let err = sale_ops::record_sale(
        &db,
        &notifier,
        &ctx(),
        SaleInput {
            lines: vec![SaleLine {
                product_id: product_id.clone(),
                quantity: 1,
            }],
            payment_method: PaymentMethod::Efectivo,
            tendered_cents: 10_000,
            customer_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OpError::Core(CoreError::ProductNotFound(_))));
}

#[tokio::test]
async fn stock_adjustment_cannot_go_negative() {
    let db = test_db().await;
    let notifier = ReplicationNotifier::disabled();
    let product_id = seed_product(&db, "Leche", "LECHE", 2_500, 3).await;

    let err = inventory::adjust_stock(
        &db,
        &notifier,
        &ctx(),
        &product_id,
        -5,
        MovementReason::Damage,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        OpError::Core(CoreError::InsufficientStock { .. })
    ));

    inventory::adjust_stock(
        &db,
        &notifier,
        &ctx(),
        &product_id,
        7,
        MovementReason::Restock,
    )
    .await
    .unwrap();
    let p = db.products().get(&product_id).await.unwrap().unwrap();
    assert_eq!(p.stock, 10);
}

// =============================================================================
// Validation Never Reaches Storage
// =============================================================================

#[tokio::test]
async fn rejected_inputs_write_nothing() {
    let db = test_db().await;
    let notifier = ReplicationNotifier::disabled();

    let err = inventory::create_product(
        &db,
        &notifier,
        &ctx(),
        NewProduct {
            name: "  ".to_string(),
            price_cents: 1_000,
            cost_cents: 0,
            initial_stock: 0,
            sku: "X".to_string(),
            category: None,
            unit: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OpError::Core(CoreError::Validation(_))));

    assert!(db.products().list(BIZ).await.unwrap().is_empty());
    assert_eq!(db.queue().count().await.unwrap(), 0);
    assert!(db.audit().recent(BIZ, 10).await.unwrap().is_empty());
}

// =============================================================================
// Held Orders (local-only)
// =============================================================================

#[tokio::test]
async fn held_orders_never_enter_the_queue() {
    let db = test_db().await;

    let order = held_order::park(&db, &ctx(), "mesa 4", r#"[{"product_id":"p1","qty":2}]"#)
        .await
        .unwrap();
    assert_eq!(db.held_orders().list(BIZ).await.unwrap().len(), 1);
    assert_eq!(db.queue().count().await.unwrap(), 0);

    let resumed = held_order::resume(&db, &order.id).await.unwrap();
    assert_eq!(resumed.label, "mesa 4");
    assert!(db.held_orders().list(BIZ).await.unwrap().is_empty());
}

// =============================================================================
// Queue Ordering
// =============================================================================

#[tokio::test]
async fn queue_drains_in_global_fifo_order() {
    let db = test_db().await;
    seed_product(&db, "A", "SKU-A", 100, 1).await;
    seed_product(&db, "B", "SKU-B", 100, 1).await;

    let entries = db.queue().pending(100).await.unwrap();
    assert!(entries.len() >= 2);
    let seqs: Vec<i64> = entries.iter().map(|e| e.seq).collect();
    let mut sorted = seqs.clone();
    sorted.sort_unstable();
    assert_eq!(seqs, sorted);

    // Payloads decode back into typed envelopes.
    for entry in &entries {
        let payload: QueuePayload = serde_json::from_str(&entry.payload).unwrap();
        assert_eq!(payload.kind(), entry.kind);
        assert_eq!(payload.entity_id(), entry.entity_id);
    }
}
