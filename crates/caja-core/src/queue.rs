//! # Action Queue Payload Envelope
//!
//! Typed payloads for the outbound action queue.
//!
//! ## The Envelope Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Queue Payload Dispatch                                 │
//! │                                                                         │
//! │  Domain transaction                                                     │
//! │       │  serde_json::to_string(&QueuePayload::Movement(mv))            │
//! │       ▼                                                                 │
//! │  action_queue row:  kind = 'MOVEMENT', payload = '{"kind":...}'        │
//! │       │                                                                 │
//! │       ▼  (later, sync engine drains FIFO)                              │
//! │  push dispatcher:  match payload {                                     │
//! │       Movement(mv)     => remote.insert_movement(mv),                  │
//! │       Shift(shift)     => remote.upsert_shift(shift),                  │
//! │       CustomerSync(cs) => upsert or delete per cs.op,                  │
//! │       ...                                                              │
//! │  }                                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each variant carries a concretely-typed snapshot of the entity at commit
//! time, so the push protocol never re-reads mutable state to replicate a
//! historical action.

use serde::{Deserialize, Serialize};

use crate::types::{
    AuditLog, CashMovement, CashShift, Customer, InventoryMovement, Product, QueueKind, Sale,
    SaleItem,
};

// =============================================================================
// Envelope Variants
// =============================================================================

/// A sale plus its frozen line items, replicated as one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleEnvelope {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Upsert vs delete, for entity-sync payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOp {
    Upsert,
    Delete,
}

/// A product snapshot plus the remote operation it requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSync {
    pub op: SyncOp,
    pub product: Product,
}

/// A customer snapshot plus the remote operation it requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSync {
    pub op: SyncOp,
    pub customer: Customer,
}

// =============================================================================
// The Tagged Union
// =============================================================================

/// Typed action-queue payload, keyed by entry kind.
///
/// Serialized into the `payload` column of the action queue; the `kind`
/// column duplicates the tag so the engine can filter without decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum QueuePayload {
    #[serde(rename = "SALE")]
    Sale(SaleEnvelope),
    #[serde(rename = "PRODUCT_SYNC")]
    ProductSync(ProductSync),
    #[serde(rename = "MOVEMENT")]
    Movement(InventoryMovement),
    #[serde(rename = "SHIFT")]
    Shift(CashShift),
    #[serde(rename = "CASH_MOVEMENT")]
    CashMovement(CashMovement),
    #[serde(rename = "CUSTOMER_SYNC")]
    CustomerSync(CustomerSync),
    #[serde(rename = "AUDIT")]
    Audit(AuditLog),
}

impl QueuePayload {
    /// The queue kind tag stored alongside the payload.
    pub fn kind(&self) -> QueueKind {
        match self {
            QueuePayload::Sale(_) => QueueKind::Sale,
            QueuePayload::ProductSync(_) => QueueKind::ProductSync,
            QueuePayload::Movement(_) => QueueKind::Movement,
            QueuePayload::Shift(_) => QueueKind::Shift,
            QueuePayload::CashMovement(_) => QueueKind::CashMovement,
            QueuePayload::CustomerSync(_) => QueueKind::CustomerSync,
            QueuePayload::Audit(_) => QueueKind::Audit,
        }
    }

    /// Id of the entity this payload snapshots (for dedup/removal).
    pub fn entity_id(&self) -> &str {
        match self {
            QueuePayload::Sale(env) => &env.sale.id,
            QueuePayload::ProductSync(ps) => &ps.product.id,
            QueuePayload::Movement(mv) => &mv.id,
            QueuePayload::Shift(shift) => &shift.id,
            QueuePayload::CashMovement(cm) => &cm.id,
            QueuePayload::CustomerSync(cs) => &cs.customer.id,
            QueuePayload::Audit(entry) => &entry.id,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MovementReason, SyncStatus};
    use chrono::Utc;

    fn sample_movement() -> InventoryMovement {
        InventoryMovement {
            id: "mv-1".to_string(),
            business_id: "biz-1".to_string(),
            product_id: "prod-1".to_string(),
            qty_change: -3,
            reason: MovementReason::Sale,
            staff_id: Some("staff-1".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_payload_round_trip_keeps_kind_tag() {
        let payload = QueuePayload::Movement(sample_movement());
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"kind\":\"MOVEMENT\""));

        let back: QueuePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), QueueKind::Movement);
        assert_eq!(back.entity_id(), "mv-1");
    }

    #[test]
    fn test_kind_matches_variant() {
        let payload = QueuePayload::Movement(sample_movement());
        assert_eq!(payload.kind(), QueueKind::Movement);
    }

    #[test]
    fn test_customer_sync_op_wire_format() {
        let customer = Customer {
            id: "c-1".to_string(),
            business_id: "biz-1".to_string(),
            name: "Ana".to_string(),
            phone: None,
            email: None,
            loyalty_points: 0,
            deleted_at: None,
            sync_status: SyncStatus::PendingCreate,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let payload = QueuePayload::CustomerSync(CustomerSync {
            op: SyncOp::Delete,
            customer,
        });
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"op\":\"delete\""));
        assert!(json.contains("\"kind\":\"CUSTOMER_SYNC\""));
    }
}
