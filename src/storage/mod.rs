//! Storage Module
//!
//! The expiry-aware record store: engine, store boundary, background
//! sweeper, and statistics.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     ExpiryEngine                         │
//! │   add / try_once / get / exists / time_left / delete     │
//! │                          │                               │
//! │                          ▼                               │
//! │   ┌──────────────────────────────────────────────────┐   │
//! │   │         RecordStore (MemoryStore)                │   │
//! │   │   HashMap<RecordKey, Record>                     │   │
//! │   │   BTreeSet expiry index on (created, ttl)        │   │
//! │   └──────────────────────────────────────────────────┘   │
//! │                          ▲                               │
//! │                          │                               │
//! │        ┌─────────────────┴─────────────────┐             │
//! │        │             Sweeper               │             │
//! │        │     (background Tokio task)       │             │
//! │        └───────────────────────────────────┘             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads apply the liveness predicate on access (lazy expiry); the sweeper
//! physically reclaims expired records on an interval (eager expiry). Both
//! derive liveness from the same stored `(created, ttl)` pair, so they can
//! never disagree about whether a record is available.

pub mod engine;
pub mod record;
pub mod stats;
pub mod store;
pub mod sweeper;

// Re-export commonly used types
pub use engine::ExpiryEngine;
pub use record::{Record, RecordKey, RecordMeta};
pub use stats::{GroupStats, StoreStats};
pub use store::{MemoryStore, RecordStore, StoreError};
pub use sweeper::{sweep_once, SweepConfig, SweepReport, Sweeper};
