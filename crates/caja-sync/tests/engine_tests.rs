//! Integration tests for the pull/push protocols, run against an in-memory
//! SQLite store and an in-memory fake remote.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use caja_core::{
    AuditLog, BusinessContext, BusinessSettings, BusinessStatus, CashMovement, CashShift, Customer,
    InventoryMovement, PaymentMethod, Product, QueueKind, Sale, SaleItem, SyncStatus,
};
use caja_db::ops::customer::NewCustomer;
use caja_db::ops::inventory::NewProduct;
use caja_db::ops::sale::{SaleInput, SaleLine};
use caja_db::ops::settings::SettingsEdit;
use caja_db::ops::{customer as customer_ops, inventory, sale as sale_ops, settings as settings_ops, shift as shift_ops};
use caja_db::{Database, DbConfig, ReplicationNotifier};
use caja_sync::{RemoteStore, Session, SyncEngine, SyncError, SyncResult};

const BIZ: &str = "biz-1";
const USER: &str = "user-1";

// =============================================================================
// Fake Remote
// =============================================================================

#[derive(Default)]
struct RemoteState {
    session: Option<Session>,
    /// Every remote call fails with a transport error (network down).
    offline: bool,
    /// Reads work but every write fails (flaky server).
    fail_writes: bool,
    profiles: HashMap<String, String>,
    products: HashMap<String, Product>,
    sales: HashMap<String, Sale>,
    sale_items: HashMap<String, Vec<SaleItem>>,
    movements: Vec<InventoryMovement>,
    shifts: HashMap<String, CashShift>,
    cash_movements: Vec<CashMovement>,
    customers: HashMap<String, Customer>,
    audits: Vec<AuditLog>,
    settings: HashMap<String, BusinessSettings>,
}

/// In-memory [`RemoteStore`] with switchable failure modes.
struct FakeRemote {
    state: Mutex<RemoteState>,
}

impl FakeRemote {
    /// A signed-in remote mapping `USER` to `BIZ`.
    fn signed_in() -> Arc<Self> {
        let mut state = RemoteState::default();
        state.session = Some(Session {
            user_id: USER.to_string(),
        });
        state.profiles.insert(USER.to_string(), BIZ.to_string());
        Arc::new(FakeRemote {
            state: Mutex::new(state),
        })
    }

    fn signed_out() -> Arc<Self> {
        Arc::new(FakeRemote {
            state: Mutex::new(RemoteState::default()),
        })
    }

    fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    fn set_fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut RemoteState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    fn check_read(&self) -> SyncResult<()> {
        if self.state.lock().unwrap().offline {
            return Err(SyncError::Transport("connection refused".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> SyncResult<()> {
        let state = self.state.lock().unwrap();
        if state.offline || state.fail_writes {
            return Err(SyncError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn session(&self) -> SyncResult<Option<Session>> {
        // The session is cached locally; it survives going offline.
        Ok(self.state.lock().unwrap().session.clone())
    }

    async fn fetch_profile_business(&self, user_id: &str) -> SyncResult<Option<String>> {
        self.check_read()?;
        Ok(self.with_state(|s| s.profiles.get(user_id).cloned()))
    }

    async fn fetch_products(&self, business_id: &str) -> SyncResult<Vec<Product>> {
        self.check_read()?;
        Ok(self.with_state(|s| {
            s.products
                .values()
                .filter(|p| p.business_id == business_id)
                .cloned()
                .collect()
        }))
    }

    async fn fetch_settings(&self, business_id: &str) -> SyncResult<Option<BusinessSettings>> {
        self.check_read()?;
        Ok(self.with_state(|s| s.settings.get(business_id).cloned()))
    }

    async fn upsert_product(&self, product: &Product) -> SyncResult<()> {
        self.check_write()?;
        self.with_state(|s| s.products.insert(product.id.clone(), product.clone()));
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> SyncResult<()> {
        self.check_write()?;
        match self.with_state(|s| s.products.remove(id)) {
            Some(_) => Ok(()),
            None => Err(SyncError::NotFound(format!("products/{}", id))),
        }
    }

    async fn upsert_sale(&self, sale: &Sale, items: &[SaleItem]) -> SyncResult<()> {
        self.check_write()?;
        self.with_state(|s| {
            s.sales.insert(sale.id.clone(), sale.clone());
            s.sale_items.insert(sale.id.clone(), items.to_vec());
        });
        Ok(())
    }

    async fn insert_movement(&self, movement: &InventoryMovement) -> SyncResult<()> {
        self.check_write()?;
        self.with_state(|s| {
            // Idempotent by id, like the real row store.
            if !s.movements.iter().any(|m| m.id == movement.id) {
                s.movements.push(movement.clone());
            }
        });
        Ok(())
    }

    async fn upsert_shift(&self, shift: &CashShift) -> SyncResult<()> {
        self.check_write()?;
        self.with_state(|s| s.shifts.insert(shift.id.clone(), shift.clone()));
        Ok(())
    }

    async fn insert_cash_movement(&self, movement: &CashMovement) -> SyncResult<()> {
        self.check_write()?;
        self.with_state(|s| {
            if !s.cash_movements.iter().any(|m| m.id == movement.id) {
                s.cash_movements.push(movement.clone());
            }
        });
        Ok(())
    }

    async fn upsert_customer(&self, customer: &Customer) -> SyncResult<()> {
        self.check_write()?;
        self.with_state(|s| s.customers.insert(customer.id.clone(), customer.clone()));
        Ok(())
    }

    async fn delete_customer(&self, id: &str) -> SyncResult<()> {
        self.check_write()?;
        match self.with_state(|s| s.customers.remove(id)) {
            Some(_) => Ok(()),
            None => Err(SyncError::NotFound(format!("customers/{}", id))),
        }
    }

    async fn insert_audit(&self, entry: &AuditLog) -> SyncResult<()> {
        self.check_write()?;
        self.with_state(|s| {
            if !s.audits.iter().any(|a| a.id == entry.id) {
                s.audits.push(entry.clone());
            }
        });
        Ok(())
    }

    async fn upsert_settings(&self, settings: &BusinessSettings) -> SyncResult<()> {
        self.check_write()?;
        self.with_state(|s| {
            s.settings
                .insert(settings.business_id.clone(), settings.clone())
        });
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn ctx() -> BusinessContext {
    BusinessContext::staff(BIZ, "staff-1", "Ana")
}

fn engine(db: &Database, remote: &Arc<FakeRemote>) -> SyncEngine {
    SyncEngine::new(db.clone(), remote.clone() as Arc<dyn RemoteStore>, 100)
}

async fn seed_product(db: &Database, name: &str, sku: &str, price: i64, stock: i64) -> String {
    inventory::create_product(
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
    .unwrap()
    .id
}

async fn ring_cash_sale(db: &Database, product_id: &str, tendered: i64) -> String {
    sale_ops::record_sale(
        db,
        &ReplicationNotifier::disabled(),
        &ctx(),
        SaleInput {
            lines: vec![SaleLine {
                product_id: product_id.to_string(),
                quantity: 1,
            }],
            payment_method: PaymentMethod::Efectivo,
            tendered_cents: tendered,
            customer_id: None,
        },
    )
    .await
    .unwrap()
    .sale
    .id
}

fn remote_product(id: &str) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        business_id: BIZ.to_string(),
        name: "Remoto".to_string(),
        price_cents: 2_500,
        cost_cents: 1_000,
        stock: 42,
        sku: format!("SKU-{}", id),
        category: Some("abarrotes".to_string()),
        unit: None,
        deleted_at: None,
        sync_status: SyncStatus::Synced,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Push
// =============================================================================

#[tokio::test]
async fn push_drains_pending_state_and_queue() {
    let db = test_db().await;
    let remote = FakeRemote::signed_in();
    let product_id = seed_product(&db, "Coca-Cola 600ml", "COCA-600", 1_900, 10).await;
    shift_ops::open_shift(&db, &ReplicationNotifier::disabled(), &ctx(), 50_000)
        .await
        .unwrap();
    let sale_id = ring_cash_sale(&db, &product_id, 2_000).await;

    let report = engine(&db, &remote).push().await;

    assert!(report.is_clean());
    assert_eq!(report.products_pushed, 1);
    assert_eq!(report.sales_pushed, 1);
    assert!(report.queue_drained >= 3); // movements + shift + audits

    // Everything arrived.
    remote.with_state(|s| {
        assert!(s.products.contains_key(&product_id));
        assert!(s.sales.contains_key(&sale_id));
        assert_eq!(s.sale_items[&sale_id].len(), 1);
        assert!(s.movements.iter().any(|m| m.product_id == product_id));
        assert_eq!(s.shifts.len(), 1);
        assert!(!s.audits.is_empty());
    });

    // Everything marked synced, nothing left queued.
    let product = db.products().get(&product_id).await.unwrap().unwrap();
    assert_eq!(product.sync_status, SyncStatus::Synced);
    let sale = db.sales().get(&sale_id).await.unwrap().unwrap();
    assert_eq!(sale.sync_status, SyncStatus::Synced);
    assert_eq!(db.queue().count().await.unwrap(), 0);
}

#[tokio::test]
async fn push_is_idempotent() {
    let db = test_db().await;
    let remote = FakeRemote::signed_in();
    let product_id = seed_product(&db, "Agua 1L", "AGUA-1L", 1_200, 5).await;
    shift_ops::open_shift(&db, &ReplicationNotifier::disabled(), &ctx(), 0)
        .await
        .unwrap();
    ring_cash_sale(&db, &product_id, 1_200).await;

    engine(&db, &remote).push().await;
    let (products, sales, movements) =
        remote.with_state(|s| (s.products.len(), s.sales.len(), s.movements.len()));

    // A second cycle finds nothing pending and changes nothing remotely.
    let second = engine(&db, &remote).push().await;
    assert!(second.is_clean());
    assert_eq!(second.products_pushed, 0);
    assert_eq!(second.sales_pushed, 0);
    assert_eq!(second.queue_drained, 0);

    remote.with_state(|s| {
        assert_eq!(s.products.len(), products);
        assert_eq!(s.sales.len(), sales);
        assert_eq!(s.movements.len(), movements);
    });
}

#[tokio::test]
async fn failed_uploads_stay_pending_and_recover() {
    let db = test_db().await;
    let remote = FakeRemote::signed_in();
    remote.set_fail_writes(true);
    let product_id = seed_product(&db, "Pan", "PAN", 800, 5).await;

    let queued_before = db.queue().count().await.unwrap();
    let report = engine(&db, &remote).push().await;

    // Reads worked, every upload failed; nothing was lost or consumed.
    assert!(report.failures > 0);
    assert_eq!(report.products_pushed, 0);
    let product = db.products().get(&product_id).await.unwrap().unwrap();
    assert_eq!(product.sync_status, SyncStatus::PendingCreate);
    assert_eq!(db.queue().count().await.unwrap(), queued_before);

    // Failed attempts are visible on the entries.
    let entries = db.queue().pending(100).await.unwrap();
    assert!(entries.iter().all(|e| e.attempts >= 1));
    assert!(entries.iter().all(|e| e.last_error.is_some()));

    // Connectivity returns: the same state drains completely.
    remote.set_fail_writes(false);
    let report = engine(&db, &remote).push().await;
    assert!(report.is_clean());
    assert_eq!(report.products_pushed, 1);
    assert_eq!(db.queue().count().await.unwrap(), 0);
    let product = db.products().get(&product_id).await.unwrap().unwrap();
    assert_eq!(product.sync_status, SyncStatus::Synced);
}

#[tokio::test]
async fn offline_push_is_a_safe_no_op() {
    let db = test_db().await;
    let remote = FakeRemote::signed_in();
    seed_product(&db, "Queso", "QUESO", 4_000, 3).await;
    remote.set_offline(true);

    let queued_before = db.queue().count().await.unwrap();
    let report = engine(&db, &remote).push().await;

    // The profile lookup failed, so the whole cycle was skipped.
    assert_eq!(report, Default::default());
    assert_eq!(db.queue().count().await.unwrap(), queued_before);
}

#[tokio::test]
async fn signed_out_sync_is_silent() {
    let db = test_db().await;
    let remote = FakeRemote::signed_out();
    let product_id = seed_product(&db, "Cafe", "CAFE", 9_000, 4).await;

    let report = engine(&db, &remote).push().await;
    engine(&db, &remote).pull().await;

    assert_eq!(report, Default::default());
    let product = db.products().get(&product_id).await.unwrap().unwrap();
    assert_eq!(product.sync_status, SyncStatus::PendingCreate);
    remote.with_state(|s| assert!(s.products.is_empty()));
}

#[tokio::test]
async fn delete_of_remotely_missing_row_still_finalizes() {
    let db = test_db().await;
    let remote = FakeRemote::signed_in();
    let notifier = ReplicationNotifier::disabled();
    let product_id = seed_product(&db, "Vino", "VINO", 30_000, 2).await;

    // Simulate a completed upload, then delete locally. The remote row is
    // absent (already removed elsewhere), so the delete answers NotFound.
    db.products().set_synced(&product_id).await.unwrap();
    inventory::delete_product(&db, &notifier, &ctx(), &product_id)
        .await
        .unwrap();

    let report = engine(&db, &remote).push().await;

    assert_eq!(report.products_deleted, 1);
    assert!(db.products().get(&product_id).await.unwrap().is_none());
    let leftover = db
        .queue()
        .pending(100)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.kind == QueueKind::ProductSync)
        .count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn customer_lifecycle_replays_in_fifo_order() {
    let db = test_db().await;
    let remote = FakeRemote::signed_in();
    let notifier = ReplicationNotifier::disabled();

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
    customer_ops::delete_customer(&db, &notifier, &ctx(), &customer.id)
        .await
        .unwrap();

    // The queue replays create-then-delete; the net remote state is empty
    // and the local soft-deleted row is gone.
    let report = engine(&db, &remote).push().await;
    assert!(report.is_clean());
    remote.with_state(|s| assert!(s.customers.is_empty()));
    assert!(db.customers().get(&customer.id).await.unwrap().is_none());
}

#[tokio::test]
async fn settings_upload_every_cycle() {
    let db = test_db().await;
    let remote = FakeRemote::signed_in();
    let notifier = ReplicationNotifier::disabled();

    settings_ops::update_settings(
        &db,
        &notifier,
        &ctx(),
        SettingsEdit {
            name: "Abarrotes Don Luis".to_string(),
            address: None,
            phone: None,
            receipt_message: Some("Gracias por su compra".to_string()),
        },
    )
    .await
    .unwrap();

    let report = engine(&db, &remote).push().await;
    assert!(report.settings_uploaded);
    remote.with_state(|s| assert_eq!(s.settings[BIZ].name, "Abarrotes Don Luis"));
    let local = db.settings().get(BIZ).await.unwrap().unwrap();
    assert_eq!(local.sync_status, SyncStatus::Synced);

    // The upload is unconditional: a drifted remote row is re-stamped even
    // with no local edits since the last cycle.
    remote.with_state(|s| {
        if let Some(row) = s.settings.get_mut(BIZ) {
            row.name = "drift".to_string();
        }
    });
    let report = engine(&db, &remote).push().await;
    assert!(report.settings_uploaded);
    remote.with_state(|s| assert_eq!(s.settings[BIZ].name, "Abarrotes Don Luis"));
}

// =============================================================================
// Pull
// =============================================================================

#[tokio::test]
async fn pull_replaces_catalog_and_settings() {
    let db = test_db().await;
    let remote = FakeRemote::signed_in();

    remote.with_state(|s| {
        let p = remote_product("prod-r1");
        s.products.insert(p.id.clone(), p);
        s.settings.insert(
            BIZ.to_string(),
            BusinessSettings {
                business_id: BIZ.to_string(),
                name: "Tienda Central".to_string(),
                address: Some("Av. Juarez 10".to_string()),
                phone: None,
                receipt_message: None,
                status: BusinessStatus::Active,
                sync_status: SyncStatus::Synced,
                updated_at: Utc::now(),
            },
        );
    });

    engine(&db, &remote).pull().await;

    let product = db.products().get("prod-r1").await.unwrap().unwrap();
    assert_eq!(product.name, "Remoto");
    assert_eq!(product.stock, 42);
    assert_eq!(product.sync_status, SyncStatus::Synced);

    let settings = db.settings().get(BIZ).await.unwrap().unwrap();
    assert_eq!(settings.name, "Tienda Central");
    assert_eq!(settings.sync_status, SyncStatus::Synced);
}

#[tokio::test]
async fn pull_overwrites_local_rows_with_remote_state() {
    let db = test_db().await;
    let remote = FakeRemote::signed_in();

    // Local and remote know the same product id; the remote copy wins.
    let mut local = remote_product("prod-shared");
    local.name = "Nombre viejo".to_string();
    local.stock = 1;
    db.products().replace_from_remote(&[local]).await.unwrap();

    remote.with_state(|s| {
        let p = remote_product("prod-shared");
        s.products.insert(p.id.clone(), p);
    });

    engine(&db, &remote).pull().await;

    let product = db.products().get("prod-shared").await.unwrap().unwrap();
    assert_eq!(product.name, "Remoto");
    assert_eq!(product.stock, 42);
}

#[tokio::test]
async fn offline_pull_leaves_local_state_untouched() {
    let db = test_db().await;
    let remote = FakeRemote::signed_in();
    let product_id = seed_product(&db, "Leche", "LECHE", 2_500, 3).await;
    remote.set_offline(true);

    engine(&db, &remote).pull().await;

    let product = db.products().get(&product_id).await.unwrap().unwrap();
    assert_eq!(product.name, "Leche");
    assert_eq!(product.sync_status, SyncStatus::PendingCreate);
}
