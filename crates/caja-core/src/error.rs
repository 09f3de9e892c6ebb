//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caja-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  caja-db errors (separate crate)                                        │
//! │  └── DbError          - Local store failures                            │
//! │                                                                         │
//! │  caja-sync errors (separate crate)                                      │
//! │  └── SyncError        - Remote/transport failures (never user-visible)  │
//! │                                                                         │
//! │  Only CoreError / ValidationError / DbError reach the user; sync       │
//! │  failures are logged and swallowed at the protocol boundary.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by domain transactions before or during
/// the local write. These abort the whole transaction and surface to the
/// caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id doesn't exist (or is soft-deleted) in the local store.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// In-transaction stock re-read found less stock than the line needs.
    ///
    /// ## User Workflow
    /// ```text
    /// Ring sale (qty: 5)
    ///      │
    ///      ▼
    /// Re-read stock inside tx: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "COCA-600", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Whole transaction rolls back - no partial decrement
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// A sale requires an open shift and none exists for the business.
    #[error("No open shift for business {0}")]
    NoOpenShift(String),

    /// Shift-open precondition failed: one is already open.
    #[error("Business already has an open shift: {shift_id}")]
    ShiftAlreadyOpen { shift_id: String },

    /// Operation targets a shift that is already closed (terminal state).
    #[error("Shift {0} is closed")]
    ShiftClosed(String),

    /// Shift id doesn't exist.
    #[error("Shift not found: {0}")]
    ShiftNotFound(String),

    /// Customer id doesn't exist (or is soft-deleted).
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Cash tendered is less than the sale total.
    #[error("Insufficient tender: total {total_cents} cents, tendered {tendered_cents} cents")]
    InsufficientTender {
        total_cents: i64,
        tendered_cents: i64,
    },

    /// Input validation failure (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, rejected before any storage write and never
/// queued.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (malformed PIN, phone, UUID, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "COCA-600".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for COCA-600: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
