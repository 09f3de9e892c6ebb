//! # caja-db: Local Store for Caja POS
//!
//! SQLite persistence layer plus the domain transaction wrappers.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           caja-db                                       │
//! │                                                                         │
//! │  ┌─────────────┐    ┌───────────────────┐    ┌──────────────────────┐  │
//! │  │   pool      │    │   repository/     │    │       ops/           │  │
//! │  │  Database   │───►│  pool reads +     │◄───│  one transaction per │  │
//! │  │  DbConfig   │    │  tx-scoped writes │    │  domain operation    │  │
//! │  └─────────────┘    └───────────────────┘    └──────────────────────┘  │
//! │        │                                              │                 │
//! │        ▼                                              ▼                 │
//! │  ┌─────────────┐                              ┌──────────────────────┐  │
//! │  │ migrations  │                              │       notify         │  │
//! │  │ (embedded)  │                              │  fire-and-forget     │  │
//! │  └─────────────┘                              │  push signal         │  │
//! │                                               └──────────────────────┘  │
//! │                                                                         │
//! │  Every domain op commits its entity rows, audit row and action-queue   │
//! │  entry in ONE transaction, then signals the sync worker.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod migrations;
pub mod notify;
pub mod ops;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use notify::{ReplicateSignal, ReplicationNotifier};
pub use ops::{OpError, OpResult};
pub use pool::{Database, DbConfig};
