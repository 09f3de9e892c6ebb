//! # Sync Engine
//!
//! The pull and push reconciliation protocols.
//!
//! ## Push Cycle (fixed category order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  push()                                                                 │
//! │    │  no session? → silent no-op                                        │
//! │    ▼                                                                    │
//! │  1. products sync_status = pending_create  → upsert  → mark synced      │
//! │  2. products sync_status = pending_update  → upsert  → mark synced      │
//! │  3. products sync_status = pending_delete  → delete  → remove row       │
//! │     │                          (remote NotFound counts as success)      │
//! │  4. sales pending                          → upsert  → mark synced      │
//! │  5. action queue drain, global FIFO        → dispatch by payload kind   │
//! │     │   success → DELETE entry   failure → attempts += 1, entry stays   │
//! │  6. business settings                      → unconditional upload       │
//! │                                                                         │
//! │  Every record is fault-isolated: one failure never aborts the cycle,    │
//! │  and push() itself never returns an error - outcomes are counted in     │
//! │  a PushReport and logged.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pull Cycle
//! ```text
//! session → profile lookup (user → business) → products overwrite-merge
//! (remote wins, rows marked synced) → settings singleton upsert.
//! Each step fault-isolated; errors logged and swallowed.
//! ```

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use caja_core::queue::{QueuePayload, SyncOp};
use caja_core::{QueueEntry, QueueKind, SyncStatus};
use caja_db::Database;

use crate::error::SyncError;
use crate::remote::{RemoteStore, Session};

/// Outcome counters for one push cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PushReport {
    /// Product creates + updates accepted remotely.
    pub products_pushed: usize,
    /// Product deletes confirmed (including already-gone rows).
    pub products_deleted: usize,
    /// Sales accepted remotely.
    pub sales_pushed: usize,
    /// Queue entries delivered and removed.
    pub queue_drained: usize,
    /// Whether the settings row was uploaded this cycle.
    pub settings_uploaded: bool,
    /// Records that failed and stayed pending.
    pub failures: usize,
}

impl PushReport {
    /// True when nothing was left behind.
    pub fn is_clean(&self) -> bool {
        self.failures == 0
    }
}

/// Reconciles the local store with the remote row store.
pub struct SyncEngine {
    db: Database,
    remote: Arc<dyn RemoteStore>,
    /// Maximum queue entries drained per cycle.
    batch_size: u32,
}

impl SyncEngine {
    /// Creates a new sync engine.
    pub fn new(db: Database, remote: Arc<dyn RemoteStore>, batch_size: u32) -> Self {
        SyncEngine {
            db,
            remote,
            batch_size,
        }
    }

    /// Resolves the authenticated session, or None when sync should be a
    /// silent no-op.
    async fn current_session(&self) -> Option<Session> {
        match self.remote.session().await {
            Ok(Some(session)) => Some(session),
            Ok(None) => {
                debug!("No session; skipping sync cycle");
                None
            }
            Err(e) => {
                warn!(error = %e, "Session lookup failed; skipping sync cycle");
                None
            }
        }
    }

    /// Resolves the business the session belongs to.
    async fn resolve_business(&self, session: &Session) -> Option<String> {
        match self.remote.fetch_profile_business(&session.user_id).await {
            Ok(Some(business_id)) => Some(business_id),
            Ok(None) => {
                warn!(user_id = %session.user_id, "No business profile for user; skipping");
                None
            }
            Err(e) => {
                warn!(error = %e, "Profile lookup failed; skipping");
                None
            }
        }
    }

    // =========================================================================
    // Pull
    // =========================================================================

    /// Downloads remote state into the local store.
    ///
    /// Remote wins wholesale (last-writer-wins): incoming rows replace local
    /// ones and are marked `synced`. Never returns an error; each step is
    /// logged and swallowed.
    pub async fn pull(&self) {
        let Some(session) = self.current_session().await else {
            return;
        };
        let Some(business_id) = self.resolve_business(&session).await else {
            return;
        };

        match self.remote.fetch_products(&business_id).await {
            Ok(products) => match self.db.products().replace_from_remote(&products).await {
                Ok(count) => info!(count, "Pull merged remote products"),
                Err(e) => error!(error = %e, "Failed to merge remote products"),
            },
            Err(e) => warn!(error = %e, "Failed to fetch remote products"),
        }

        match self.remote.fetch_settings(&business_id).await {
            Ok(Some(settings)) => {
                if let Err(e) = self.db.settings().merge_from_remote(&settings).await {
                    error!(error = %e, "Failed to merge remote settings");
                }
            }
            Ok(None) => debug!("No remote settings row yet"),
            Err(e) => warn!(error = %e, "Failed to fetch remote settings"),
        }
    }

    // =========================================================================
    // Push
    // =========================================================================

    /// Uploads pending local state in fixed category order.
    ///
    /// Never returns an error; per-record outcomes are counted in the
    /// returned [`PushReport`].
    pub async fn push(&self) -> PushReport {
        let mut report = PushReport::default();

        let Some(session) = self.current_session().await else {
            return report;
        };
        let Some(business_id) = self.resolve_business(&session).await else {
            return report;
        };

        self.push_product_upserts(SyncStatus::PendingCreate, &mut report)
            .await;
        self.push_product_upserts(SyncStatus::PendingUpdate, &mut report)
            .await;
        self.push_product_deletes(&mut report).await;
        self.push_pending_sales(&mut report).await;
        self.drain_queue(&mut report).await;
        self.push_settings(&business_id, &mut report).await;

        info!(
            products_pushed = report.products_pushed,
            products_deleted = report.products_deleted,
            sales_pushed = report.sales_pushed,
            queue_drained = report.queue_drained,
            failures = report.failures,
            "Push cycle complete"
        );
        report
    }

    /// Phase 1/2: upload products in one pending state.
    async fn push_product_upserts(&self, status: SyncStatus, report: &mut PushReport) {
        let products = match self.db.products().by_sync_status(status).await {
            Ok(products) => products,
            Err(e) => {
                error!(error = %e, "Failed to load pending products");
                report.failures += 1;
                return;
            }
        };

        for product in products {
            match self.remote.upsert_product(&product).await {
                Ok(()) => {
                    if let Err(e) = self.mark_product_synced(&product.id).await {
                        error!(error = %e, product_id = %product.id, "Failed to mark product synced");
                        report.failures += 1;
                    } else {
                        report.products_pushed += 1;
                    }
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        product_id = %product.id,
                        transient = e.is_transient(),
                        "Product upload failed; stays pending"
                    );
                    report.failures += 1;
                }
            }
        }
    }

    /// Phase 3: confirm product deletes and remove the local rows.
    async fn push_product_deletes(&self, report: &mut PushReport) {
        let products = match self
            .db
            .products()
            .by_sync_status(SyncStatus::PendingDelete)
            .await
        {
            Ok(products) => products,
            Err(e) => {
                error!(error = %e, "Failed to load pending deletes");
                report.failures += 1;
                return;
            }
        };

        for product in products {
            match self.remote.delete_product(&product.id).await {
                // Already gone remotely = the goal state holds.
                Ok(()) | Err(SyncError::NotFound(_)) => {
                    let removed = self.db.products().remove_row(&product.id).await;
                    let cleaned = self
                        .db
                        .queue()
                        .remove_for_entity(QueueKind::ProductSync, &product.id)
                        .await;
                    if let Err(e) = removed.and(cleaned.map(|_| ())) {
                        error!(error = %e, product_id = %product.id, "Failed to finalize delete");
                        report.failures += 1;
                    } else {
                        report.products_deleted += 1;
                    }
                }
                Err(e) => {
                    warn!(error = %e, product_id = %product.id, "Product delete failed; stays pending");
                    report.failures += 1;
                }
            }
        }
    }

    /// Phase 4: upload pending sales with their frozen items.
    async fn push_pending_sales(&self, report: &mut PushReport) {
        let sales = match self.db.sales().pending().await {
            Ok(sales) => sales,
            Err(e) => {
                error!(error = %e, "Failed to load pending sales");
                report.failures += 1;
                return;
            }
        };

        for sale in sales {
            let items = match self.db.sales().items(&sale.id).await {
                Ok(items) => items,
                Err(e) => {
                    error!(error = %e, sale_id = %sale.id, "Failed to load sale items");
                    report.failures += 1;
                    continue;
                }
            };

            match self.remote.upsert_sale(&sale, &items).await {
                Ok(()) => {
                    let marked = self.db.sales().set_synced(&sale.id).await;
                    let cleaned = self
                        .db
                        .queue()
                        .remove_for_entity(QueueKind::Sale, &sale.id)
                        .await;
                    if let Err(e) = marked.and(cleaned.map(|_| ())) {
                        error!(error = %e, sale_id = %sale.id, "Failed to mark sale synced");
                        report.failures += 1;
                    } else {
                        report.sales_pushed += 1;
                    }
                }
                Err(e) => {
                    warn!(error = %e, sale_id = %sale.id, "Sale upload failed; stays pending");
                    report.failures += 1;
                }
            }
        }
    }

    /// Phase 5: drain the action queue in global FIFO order.
    async fn drain_queue(&self, report: &mut PushReport) {
        let entries = match self.db.queue().pending(self.batch_size).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, "Failed to load queue entries");
                report.failures += 1;
                return;
            }
        };

        for entry in entries {
            match self.deliver_entry(&entry).await {
                Ok(()) => {
                    if let Err(e) = self.db.queue().remove(&entry.id).await {
                        error!(error = %e, entry_id = %entry.id, "Failed to remove delivered entry");
                        report.failures += 1;
                    } else {
                        report.queue_drained += 1;
                    }
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        entry_id = %entry.id,
                        kind = ?entry.kind,
                        entity_id = %entry.entity_id,
                        attempts = entry.attempts + 1,
                        "Queue entry delivery failed; stays queued"
                    );
                    if let Err(db_err) = self
                        .db
                        .queue()
                        .record_failure(&entry.id, &e.to_string())
                        .await
                    {
                        error!(error = %db_err, entry_id = %entry.id, "Failed to record attempt");
                    }
                    report.failures += 1;
                }
            }
        }
    }

    /// Dispatches one decoded queue payload to the matching remote call.
    ///
    /// Entries for entities already confirmed by the status-driven phases
    /// re-deliver harmlessly: every remote write is an idempotent upsert.
    async fn deliver_entry(&self, entry: &QueueEntry) -> Result<(), SyncError> {
        let payload: QueuePayload = serde_json::from_str(&entry.payload)?;

        match payload {
            QueuePayload::Sale(env) => {
                self.remote.upsert_sale(&env.sale, &env.items).await?;
                self.db.sales().set_synced(&env.sale.id).await?;
            }
            QueuePayload::ProductSync(ps) => match ps.op {
                SyncOp::Upsert => {
                    self.remote.upsert_product(&ps.product).await?;
                    self.mark_product_synced(&ps.product.id).await?;
                }
                SyncOp::Delete => {
                    match self.remote.delete_product(&ps.product.id).await {
                        Ok(()) | Err(SyncError::NotFound(_)) => {}
                        Err(e) => return Err(e),
                    }
                    self.db.products().remove_row(&ps.product.id).await?;
                }
            },
            QueuePayload::Movement(movement) => {
                self.remote.insert_movement(&movement).await?;
            }
            QueuePayload::Shift(shift) => {
                self.remote.upsert_shift(&shift).await?;
                self.db.shifts().set_synced(&shift.id).await?;
            }
            QueuePayload::CashMovement(movement) => {
                self.remote.insert_cash_movement(&movement).await?;
            }
            QueuePayload::CustomerSync(cs) => match cs.op {
                SyncOp::Upsert => {
                    self.remote.upsert_customer(&cs.customer).await?;
                    self.db.customers().set_synced(&cs.customer.id).await?;
                }
                SyncOp::Delete => {
                    match self.remote.delete_customer(&cs.customer.id).await {
                        Ok(()) | Err(SyncError::NotFound(_)) => {}
                        Err(e) => return Err(e),
                    }
                    self.db.customers().remove_row(&cs.customer.id).await?;
                }
            },
            QueuePayload::Audit(audit) => {
                self.remote.insert_audit(&audit).await?;
                self.db.audit().set_synced(&audit.id).await?;
            }
        }

        Ok(())
    }

    /// Phase 6: upload the settings singleton unconditionally.
    async fn push_settings(&self, business_id: &str, report: &mut PushReport) {
        let settings = match self.db.settings().get(business_id).await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!("No local settings row; nothing to upload");
                return;
            }
            Err(e) => {
                error!(error = %e, "Failed to load settings");
                report.failures += 1;
                return;
            }
        };

        match self.remote.upsert_settings(&settings).await {
            Ok(()) => {
                if let Err(e) = self.db.settings().set_synced(business_id).await {
                    error!(error = %e, "Failed to mark settings synced");
                    report.failures += 1;
                } else {
                    report.settings_uploaded = true;
                }
            }
            Err(e) => {
                warn!(error = %e, "Settings upload failed");
                report.failures += 1;
            }
        }
    }

    /// Marks a product synced locally and removes its redundant queue
    /// entries.
    async fn mark_product_synced(&self, product_id: &str) -> Result<(), SyncError> {
        self.db.products().set_synced(product_id).await?;
        self.db
            .queue()
            .remove_for_entity(QueueKind::ProductSync, product_id)
            .await?;
        Ok(())
    }
}
