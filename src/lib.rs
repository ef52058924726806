//! # emberkv - A TTL-Governed Key/Value Record Store
//!
//! emberkv stores arbitrary JSON values under a two-part identity (a
//! logical group name plus a record key), each with an expiration
//! lifetime. It enforces at-most-one-live-value-per-key, debounced
//! "first-call-wins" registration, lazy expiry on every read, and periodic
//! background reclamation of expired records.
//!
//! ## Features
//!
//! - **Debounced registration**: `add` is rejected while a live record
//!   occupies the identity, which doubles as "run an action at most once
//!   per TTL window"
//! - **Lazy + active expiry**: reads derive liveness from timestamps on
//!   access; a background sweeper physically reclaims expired records
//! - **Ordered expiry index**: the sweeper scans a `(created, ttl)` index
//!   instead of the whole table
//! - **Cooperative sweeping**: the sweeper yields to the scheduler on a
//!   configurable cadence, so large backlogs never monopolize the runtime
//! - **Per-group statistics**: total/active/expired counts, globally and
//!   per group
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                           emberkv                              │
//! │                                                                │
//! │   callers ──► ExpiryEngine ──► RecordStore (MemoryStore)       │
//! │               add / get /      HashMap + (created, ttl)        │
//! │               exists / ...     ordered expiry index            │
//! │                                        ▲                       │
//! │                                        │                       │
//! │               Clock ◄── Sweeper ───────┘                       │
//! │           (monotonic s)  (background Tokio task,               │
//! │                           two-pass scan-and-delete)            │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use emberkv::ExpiryEngine;
//! use serde_json::json;
//!
//! let engine = ExpiryEngine::new();
//!
//! // Debounced registration: first call wins for the TTL window.
//! assert!(engine.add("otp", "u1", true, 5.0).unwrap());
//! assert!(!engine.add("otp", "u1", true, 5.0).unwrap());
//!
//! // Arbitrary JSON payloads.
//! engine.add("session", "u1", json!({"role": "admin"}), 30.0).unwrap();
//! assert_eq!(
//!     engine.get("session", "u1").unwrap(),
//!     Some(json!({"role": "admin"}))
//! );
//! ```
//!
//! With the background sweeper:
//!
//! ```ignore
//! use emberkv::{ExpiryEngine, SweepConfig, Sweeper};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = Arc::new(ExpiryEngine::new());
//!     let _sweeper = Sweeper::start(Arc::clone(&engine), SweepConfig::default());
//!
//!     // ... use the engine; expired records are reclaimed every 60s.
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`storage`]: the record engine, store boundary, sweeper, and stats
//! - [`clock`]: the monotonic time collaborator
//!
//! ## Design Highlights
//!
//! ### Liveness is derived, never stored
//!
//! No record carries an "expired" flag. Liveness is the pure predicate
//! `now - created < ttl`, applied identically by reads, stats, and the
//! sweeper, so an expired-but-unswept record is indistinguishable from an
//! absent one to every read operation.
//!
//! ### Two-pass sweep
//!
//! The sweeper collects expired identities from the ordered index, then
//! deletes them conditioned on each record's `created` timestamp being
//! unchanged, so a record refreshed between the passes survives.

pub mod clock;
pub mod storage;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{
    sweep_once, ExpiryEngine, GroupStats, MemoryStore, Record, RecordKey, RecordMeta, RecordStore,
    StoreError, StoreStats, SweepConfig, SweepReport, Sweeper,
};

/// Default record lifetime in seconds.
pub const DEFAULT_TTL_SECS: f64 = 60.0;

/// Version of emberkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
