//! # Domain Types
//!
//! Core domain entities for Caja POS.
//!
//! ## Sync Status Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Per-Row Sync Status                                 │
//! │                                                                         │
//! │   create ──► pending_create ──┐                                         │
//! │                               │  push succeeds                          │
//! │   edit ────► pending_update ──┼──────────────► synced                   │
//! │                               │                   │                     │
//! │   delete ──► pending_delete ──┘                   │ edit                │
//! │                  │                                ▼                     │
//! │                  │ push succeeds           pending_update               │
//! │                  ▼                                                      │
//! │            row removed locally                                          │
//! │                                                                         │
//! │  The status tag is the SOLE signal the push protocol uses to decide    │
//! │  what to upload. It is mutated only by domain transactions and by the  │
//! │  push protocol itself on confirmed remote acceptance.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, generated offline without coordination
//! - `business_id`: tenant-isolation key; every row belongs to one business

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Sync Status
// =============================================================================

/// Per-row replication lifecycle tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Row matches the remote store (as of the last pull/push).
    Synced,
    /// Created locally, never uploaded.
    PendingCreate,
    /// Edited locally since the last successful upload.
    PendingUpdate,
    /// Deleted locally, remote delete not yet confirmed.
    PendingDelete,
}

impl SyncStatus {
    /// Returns true if the row still needs a remote write.
    #[inline]
    pub const fn is_pending(&self) -> bool {
        !matches!(self, SyncStatus::Synced)
    }
}

// =============================================================================
// Business Context
// =============================================================================

/// Request-scoped tenant and actor scope, threaded explicitly through every
/// domain transaction call.
///
/// ## Why Not Ambient State?
/// Reading a mutable "current business id" from ambient storage invites
/// cross-tenant bugs; passing the scope as a value makes every call site
/// name the tenant it writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessContext {
    /// Tenant-isolation key.
    pub business_id: String,
    /// Acting staff member; None for system-originated actions.
    pub staff_id: Option<String>,
    /// Staff name snapshot for audit records.
    pub staff_name: String,
}

impl BusinessContext {
    /// Context for a staff-originated action.
    pub fn staff(
        business_id: impl Into<String>,
        staff_id: impl Into<String>,
        staff_name: impl Into<String>,
    ) -> Self {
        BusinessContext {
            business_id: business_id.into(),
            staff_id: Some(staff_id.into()),
            staff_name: staff_name.into(),
        }
    }

    /// Context for a system-originated action (no staff reference).
    pub fn system(business_id: impl Into<String>) -> Self {
        BusinessContext {
            business_id: business_id.into(),
            staff_id: None,
            staff_name: "system".to_string(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// `stock` is a derived-but-stored quantity: every change is paired with an
/// [`InventoryMovement`] row in the same transaction for auditability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business this product belongs to.
    pub business_id: String,

    /// Display name.
    pub name: String,

    /// Sale price in cents.
    pub price_cents: i64,

    /// Cost in cents (for margin reporting; copied into sale lines).
    pub cost_cents: i64,

    /// Current stock level. Mutated only via inventory movements.
    pub stock: i64,

    /// Stock Keeping Unit - unique per business.
    pub sku: String,

    /// Optional category label.
    pub category: Option<String>,

    /// Optional unit of measure ("pieza", "kg", ...).
    pub unit: Option<String>,

    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,

    /// Replication lifecycle tag.
    pub sync_status: SyncStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when the product row is soft-deleted.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// =============================================================================
// Inventory Movement
// =============================================================================

/// Why a stock level changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementReason {
    /// Stock set when the product was created.
    Initial,
    /// Manual stock edit.
    Correction,
    /// Stock consumed by a sale.
    Sale,
    /// Stock received.
    Restock,
    /// Customer return.
    Return,
    /// Damaged / written off.
    Damage,
}

/// Immutable append-only record of a stock change.
///
/// Never updated or deleted after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryMovement {
    pub id: String,
    pub business_id: String,
    pub product_id: String,
    /// Signed quantity delta (+restock, -sale, ...).
    pub qty_change: i64,
    pub reason: MovementReason,
    /// None = system-originated.
    pub staff_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash - the only method counted in shift reconciliation.
    Efectivo,
    /// Bank transfer.
    Transferencia,
    /// Card.
    Tarjeta,
    /// Mixed tender.
    Mixto,
}

/// A completed sale transaction.
///
/// A sale cannot exist without an open shift; `shift_id` is mandatory.
/// Line items live in separate [`SaleItem`] rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub business_id: String,
    /// The open shift this sale was rung under (mandatory).
    pub shift_id: String,
    pub staff_id: Option<String>,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// Amount the customer handed over.
    pub tendered_cents: i64,
    /// Change returned (tendered - total).
    pub change_cents: i64,
    /// Optional customer reference (loyalty).
    pub customer_id: Option<String>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
}

/// A line item in a sale.
///
/// ## Snapshot Pattern
/// Product name, unit price AND unit cost are copied (not referenced) at
/// time of sale, so historical margin reporting is immune to later edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Unit cost in cents at time of sale (frozen).
    pub unit_cost_cents: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
}

// =============================================================================
// Cash Shift
// =============================================================================

/// Shift lifecycle. `Closed` is terminal; a shift is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    Open,
    Closed,
}

/// A bounded cash-drawer session, the unit of cash reconciliation.
///
/// At most one `open` shift per business at a time - enforced by a
/// query-time precondition before each shift-open transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashShift {
    pub id: String,
    pub business_id: String,
    /// Staff who opened the shift.
    pub opened_by: Option<String>,
    /// Drawer float at open.
    pub start_amount_cents: i64,
    pub opened_at: DateTime<Utc>,
    pub status: ShiftStatus,
    /// Counted amount at close.
    pub end_amount_cents: Option<i64>,
    /// Computed at close: start + cash sales + cash-in - cash-out.
    pub expected_cents: Option<i64>,
    /// Counted - expected (signed).
    pub difference_cents: Option<i64>,
    pub closed_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
}

/// Direction of a manual drawer movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CashMovementKind {
    In,
    Out,
}

/// A manual cash-drawer movement within a shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashMovement {
    pub id: String,
    pub business_id: String,
    pub shift_id: String,
    pub kind: CashMovementKind,
    /// Always positive; direction comes from `kind`.
    pub amount_cents: i64,
    /// Mandatory free-text justification.
    pub reason: String,
    pub staff_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with loyalty points.
///
/// Points grow via sales (floor(total / 10)) and are otherwise adjustable
/// only through editing the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub business_id: String,
    pub name: String,
    /// Intended unique per business when present.
    pub phone: Option<String>,
    pub email: Option<String>,
    pub loyalty_points: i64,
    pub deleted_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Audit Log
// =============================================================================

/// Business-relevant action kinds recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Sale,
    OpenShift,
    CloseShift,
    CashIn,
    CashOut,
    CreateProduct,
    UpdateProduct,
    UpdateStock,
    DeleteProduct,
    CreateCustomer,
    UpdateCustomer,
    DeleteCustomer,
    UpdateSettings,
}

/// Durable record of a business-relevant action.
///
/// Written transactionally alongside the state change it documents; never
/// standalone for a change that didn't commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLog {
    pub id: String,
    pub business_id: String,
    pub staff_id: Option<String>,
    /// Name snapshot at time of action.
    pub staff_name: String,
    pub action: AuditAction,
    /// Free-form JSON details payload.
    pub details: String,
    pub created_at: DateTime<Utc>,
    pub sync_status: SyncStatus,
}

// =============================================================================
// Action Queue
// =============================================================================

/// Tag identifying which remote table/operation a queued payload replicates
/// to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueKind {
    Sale,
    ProductSync,
    Movement,
    Shift,
    CashMovement,
    CustomerSync,
    Audit,
}

/// A durable outbound replication entry.
///
/// Appended in the same transaction as the domain write it represents and
/// removed only once the remote write succeeds (at-least-once delivery,
/// deduplicated downstream by idempotent upsert).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct QueueEntry {
    /// Global FIFO drain order (AUTOINCREMENT).
    pub seq: i64,
    pub id: String,
    pub kind: QueueKind,
    /// Id of the entity the payload snapshots.
    pub entity_id: String,
    /// JSON-encoded [`crate::queue::QueuePayload`].
    pub payload: String,
    /// Bookkeeping so stuck records stay visible.
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Business Settings
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum BusinessStatus {
    Active,
    Suspended,
}

/// Singleton-per-business settings row, keyed by the business id itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BusinessSettings {
    /// Fixed singleton key: the business id.
    pub business_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub receipt_message: Option<String>,
    pub status: BusinessStatus,
    pub sync_status: SyncStatus,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Staff
// =============================================================================

/// A staff member authenticated by a 4-digit PIN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: String,
    pub business_id: String,
    pub name: String,
    /// Exactly 4 ASCII digits.
    pub pin: String,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Held Order
// =============================================================================

/// A parked cart snapshot. Local-only: held orders never replicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct HeldOrder {
    pub id: String,
    pub business_id: String,
    /// Label shown to the cashier ("mesa 4", customer name, ...).
    pub label: String,
    /// JSON snapshot of the cart lines.
    pub lines: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_status_is_pending() {
        assert!(!SyncStatus::Synced.is_pending());
        assert!(SyncStatus::PendingCreate.is_pending());
        assert!(SyncStatus::PendingUpdate.is_pending());
        assert!(SyncStatus::PendingDelete.is_pending());
    }

    #[test]
    fn test_sync_status_wire_format() {
        let json = serde_json::to_string(&SyncStatus::PendingCreate).unwrap();
        assert_eq!(json, "\"pending_create\"");
    }

    #[test]
    fn test_payment_method_wire_format() {
        let json = serde_json::to_string(&PaymentMethod::Efectivo).unwrap();
        assert_eq!(json, "\"efectivo\"");
        let back: PaymentMethod = serde_json::from_str("\"mixto\"").unwrap();
        assert_eq!(back, PaymentMethod::Mixto);
    }

    #[test]
    fn test_audit_action_wire_format() {
        let json = serde_json::to_string(&AuditAction::CloseShift).unwrap();
        assert_eq!(json, "\"CLOSE_SHIFT\"");
    }

    #[test]
    fn test_business_context_system() {
        let ctx = BusinessContext::system("biz-1");
        assert_eq!(ctx.business_id, "biz-1");
        assert!(ctx.staff_id.is_none());
        assert_eq!(ctx.staff_name, "system");
    }
}
