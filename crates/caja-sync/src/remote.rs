//! # Remote Store Boundary
//!
//! The trait seam between the sync engine and the remote row store.
//!
//! ## Why a Trait Object
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SyncEngine { remote: Arc<dyn RemoteStore> }                            │
//! │                      │                                                  │
//! │        ┌─────────────┴──────────────┐                                   │
//! │        ▼                            ▼                                   │
//! │   HttpRemote (production)      FakeRemote (tests)                       │
//! │   reqwest against the          in-memory maps with switchable           │
//! │   hosted row store             offline / not-found behavior             │
//! │                                                                         │
//! │  Every method is one remote row operation; the engine composes them     │
//! │  into the pull and push protocols.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::SyncResult;
use caja_core::{
    AuditLog, BusinessSettings, CashMovement, CashShift, Customer, InventoryMovement, Product,
    Sale, SaleItem,
};

/// An authenticated remote session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Remote user id; maps to a business via the profile lookup.
    pub user_id: String,
}

/// Remote row-store operations used by the sync engine.
///
/// Upserts must be idempotent on the remote side (keyed by the row's UUID):
/// the push protocol delivers at-least-once.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Current session, if any. `Ok(None)` means signed out, which makes
    /// every sync cycle a silent no-op.
    async fn session(&self) -> SyncResult<Option<Session>>;

    /// Resolves the business a user belongs to.
    async fn fetch_profile_business(&self, user_id: &str) -> SyncResult<Option<String>>;

    /// Full product catalog for a business.
    async fn fetch_products(&self, business_id: &str) -> SyncResult<Vec<Product>>;

    /// The business settings row, if present remotely.
    async fn fetch_settings(&self, business_id: &str) -> SyncResult<Option<BusinessSettings>>;

    async fn upsert_product(&self, product: &Product) -> SyncResult<()>;

    /// Deletes a product row. `Err(NotFound)` when the row is already gone;
    /// the engine reclassifies that as success.
    async fn delete_product(&self, id: &str) -> SyncResult<()>;

    /// Uploads a sale with its frozen line items as one unit.
    async fn upsert_sale(&self, sale: &Sale, items: &[SaleItem]) -> SyncResult<()>;

    async fn insert_movement(&self, movement: &InventoryMovement) -> SyncResult<()>;

    async fn upsert_shift(&self, shift: &CashShift) -> SyncResult<()>;

    async fn insert_cash_movement(&self, movement: &CashMovement) -> SyncResult<()>;

    async fn upsert_customer(&self, customer: &Customer) -> SyncResult<()>;

    /// Deletes a customer row. Same not-found contract as
    /// [`RemoteStore::delete_product`].
    async fn delete_customer(&self, id: &str) -> SyncResult<()>;

    async fn insert_audit(&self, entry: &AuditLog) -> SyncResult<()>;

    async fn upsert_settings(&self, settings: &BusinessSettings) -> SyncResult<()>;
}
