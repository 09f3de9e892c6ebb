//! # caja-core: Pure Business Logic for Caja POS
//!
//! This crate is the **heart** of the Caja POS sync core. It contains all
//! business logic as pure functions and plain types with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caja POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      UI Shell (external)                        │   │
//! │  │    Catalog ──► Cart ──► Payment ──► Receipt                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ programmatic surface                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            caja-db (domain transactions, local store)           │   │
//! │  │            caja-sync (pull / push / replication worker)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ caja-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │   cash    │  │ validation│   │   │
//! │  │   │  Product  │  │   Money   │  │ expected  │  │   rules   │   │   │
//! │  │   │   Sale    │  │  (cents)  │  │   cash    │  │  checks   │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Product, Sale, CashShift, ...)
//! - [`money`] - Money type with integer-cent arithmetic (no floating point!)
//! - [`queue`] - Action queue payload envelope (tagged union per entry kind)
//! - [`cash`] - Cash-shift and change arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cash;
pub mod error;
pub mod money;
pub mod queue;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use queue::{CustomerSync, ProductSync, QueuePayload, SaleEnvelope, SyncOp};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum unique line items allowed in a single sale.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Loyalty earn rule: one point per this many cents of sale total.
///
/// floor(total / 10) in currency units = total_cents / 1000.
pub const LOYALTY_EARN_DIVISOR_CENTS: i64 = 1000;
