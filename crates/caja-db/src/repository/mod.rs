//! # Repository Modules
//!
//! Data access split by aggregate.
//!
//! ## Two Shapes of Access
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repository structs (pool)        Free functions (&mut SqliteConnection)│
//! │  ───────────────────────          ──────────────────────────────────────│
//! │  Read paths and single-row        Write paths composed by ops/ inside   │
//! │  status flips used by the UI      one transaction: the caller owns the  │
//! │  and the sync engine.             commit/rollback decision.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod audit;
pub mod customer;
pub mod held_order;
pub mod product;
pub mod queue;
pub mod sale;
pub mod settings;
pub mod shift;
pub mod staff;
