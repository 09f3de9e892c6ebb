//! # Domain Transaction Wrappers
//!
//! One function per user-facing action; each is the ONLY write path for its
//! aggregate.
//!
//! ## The Wrapper Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every op follows the same shape:                                       │
//! │                                                                         │
//! │  1. Validate inputs (pure, caja-core) - rejects never touch storage     │
//! │  2. BEGIN one transaction                                               │
//! │  3. Check preconditions against CURRENT rows (open shift, stock, ...)   │
//! │  4. Entity writes + exactly one audit row + queue entries               │
//! │  5. COMMIT - all or nothing                                             │
//! │  6. notifier.notify() - fire-and-forget push signal, never awaited      │
//! │                                                                         │
//! │  The local write NEVER waits on the network.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod held_order;
pub mod inventory;
pub mod sale;
pub mod settings;
pub mod shift;

use thiserror::Error;

use crate::error::DbError;
use caja_core::CoreError;

/// User-visible failure of a domain operation.
#[derive(Debug, Error)]
pub enum OpError {
    /// Business rule or validation violation; the transaction never
    /// committed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Local store failure; the transaction rolled back and the action can
    /// be retried.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for OpError {
    fn from(err: sqlx::Error) -> Self {
        OpError::Db(DbError::from(err))
    }
}

impl From<caja_core::error::ValidationError> for OpError {
    fn from(err: caja_core::error::ValidationError) -> Self {
        OpError::Core(CoreError::Validation(err))
    }
}

/// Result type for domain operations.
pub type OpResult<T> = Result<T, OpError>;
