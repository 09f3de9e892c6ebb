//! # Caja Sync
//!
//! Offline-first replication between a register's local SQLite store and
//! the hosted row store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          caja-sync crate                                │
//! │                                                                         │
//! │   write path (caja-db ops)                                              │
//! │        │ commit + ReplicationNotifier::notify()                         │
//! │        ▼                                                                │
//! │   ┌──────────────┐   push()/pull()   ┌──────────────┐    HTTP           │
//! │   │  SyncWorker  │ ────────────────► │  SyncEngine  │ ───────────►      │
//! │   │  (tokio task)│                   │              │  RemoteStore      │
//! │   └──────────────┘                   └──────────────┘  (HttpRemote)     │
//! │        ▲                                                                │
//! │        │ interval tick (poll_interval_secs)                             │
//! │                                                                         │
//! │   The register never waits on the network: every remote effect rides    │
//! │   the action queue and the status-driven push phases, delivered         │
//! │   at-least-once against idempotent remote upserts.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - `config`: TOML + environment configuration
//! - `engine`: pull and push reconciliation protocols
//! - `error`: failure taxonomy (transient vs permanent vs not-found)
//! - `http`: production [`RemoteStore`] over a PostgREST-style REST surface
//! - `remote`: the trait seam between engine and remote store
//! - `worker`: background task wiring signals and timers to the engine

pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod remote;
pub mod worker;

pub use config::{RemoteSettings, SyncConfig, SyncSettings};
pub use engine::{PushReport, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use http::HttpRemote;
pub use remote::{RemoteStore, Session};
pub use worker::{SyncWorker, WorkerHandle};
