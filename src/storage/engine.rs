//! Expiry-Aware Record Engine
//!
//! This module implements the core operation surface of emberkv: debounced
//! registration, lazy-expiry reads, and explicit deletion over records
//! addressed by a (group, key) identity.
//!
//! ## Liveness Model
//!
//! A record is live while `now - created < ttl`. That predicate is the only
//! expiry mechanism reads ever apply: a record whose lifetime has elapsed is
//! reported as absent immediately, whether or not the background sweeper has
//! physically removed it yet. Reads never mutate the store; physical
//! reclamation belongs to the [sweeper](crate::storage::sweeper).
//!
//! ## Debounce
//!
//! `add` is first-call-wins within a TTL window: while the existing record
//! is live, re-adding the same identity returns `false` and changes
//! nothing. Once the record's lifetime has elapsed, the next `add`
//! overwrites it in place with a fresh `created`/`ttl`/value. `try_once`
//! exposes the same contract with a marker value, which is all that "run
//! this action at most once per window" needs.
//!
//! ## Example
//!
//! ```
//! use emberkv::storage::ExpiryEngine;
//! use serde_json::json;
//!
//! let engine = ExpiryEngine::new();
//!
//! // First registration wins...
//! assert!(engine.add("otp", "u1", true, 5.0).unwrap());
//! // ...and the identity is debounced while the record is live.
//! assert!(!engine.add("otp", "u1", true, 5.0).unwrap());
//!
//! // Payloads are arbitrary JSON values.
//! engine.add("session", "u1", json!({"role": "admin"}), 30.0).unwrap();
//! assert_eq!(
//!     engine.get("session", "u1").unwrap(),
//!     Some(json!({"role": "admin"}))
//! );
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::storage::record::{Record, RecordKey};
use crate::storage::store::{MemoryStore, RecordStore, StoreError};

/// The expiry-aware record engine.
///
/// Generic over its [`RecordStore`] collaborator; `ExpiryEngine::new()`
/// builds the common in-memory configuration. All operations are
/// synchronous and run to completion; the engine is safe to share behind an
/// `Arc` with the background sweeper.
pub struct ExpiryEngine<S = MemoryStore> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl ExpiryEngine<MemoryStore> {
    /// Creates an engine over an in-memory store and the system clock.
    pub fn new() -> Self {
        Self::with_parts(MemoryStore::new(), Arc::new(SystemClock::new()))
    }
}

impl Default for ExpiryEngine<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RecordStore> ExpiryEngine<S> {
    /// Creates an engine over an explicit store and clock.
    ///
    /// Tests pass a [`ManualClock`](crate::clock::ManualClock) here to
    /// simulate the passage of time.
    pub fn with_parts(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Registers a value under `(group, key)` with the given lifetime.
    ///
    /// The key is coerced to its string form, so `42` and `"42"` address
    /// the same record. If a live record already occupies the identity the
    /// call returns `false` and leaves it untouched; otherwise the record
    /// is written (overwriting an expired one in place) and the call
    /// returns `true`.
    ///
    /// The check and the write happen in one atomic single-key operation of
    /// the store collaborator.
    pub fn add(
        &self,
        group: &str,
        key: impl ToString,
        value: impl Into<Value>,
        ttl: f64,
    ) -> Result<bool, StoreError> {
        let id = RecordKey::new(group, key);
        let now = self.clock.now();
        self.store
            .put_if_expired(id, Record::new(value.into(), now, ttl), now)
    }

    /// Registers a marker under `(group, key)`: [`add`](Self::add) with the
    /// value fixed to `true`.
    ///
    /// Returns `true` the first time within each TTL window, `false` on
    /// every debounced repeat.
    pub fn try_once(&self, group: &str, key: impl ToString, ttl: f64) -> Result<bool, StoreError> {
        self.add(group, key, true, ttl)
    }

    /// Reads the value stored under `(group, key)`.
    ///
    /// Returns `None` when no record exists or its lifetime has elapsed
    /// (`now - created >= ttl`). Pure read: an expired record is reported
    /// absent but left in place for the sweeper.
    pub fn get(&self, group: &str, key: impl ToString) -> Result<Option<Value>, StoreError> {
        let id = RecordKey::new(group, key);
        let now = self.clock.now();
        Ok(self
            .store
            .get(&id)?
            .filter(|record| record.is_live(now))
            .map(|record| record.value))
    }

    /// Seconds of lifetime remaining for `(group, key)`.
    ///
    /// `None` when no record physically exists. An expired record that has
    /// not been swept yet reports `Some(0.0)`, never a negative number.
    /// At the exact expiry instant [`get`](Self::get) already reports
    /// absence while this still returns `Some(0.0)`.
    pub fn time_left(&self, group: &str, key: impl ToString) -> Result<Option<f64>, StoreError> {
        let id = RecordKey::new(group, key);
        let now = self.clock.now();
        Ok(self.store.get(&id)?.map(|record| record.time_left(now)))
    }

    /// Whether a live record exists under `(group, key)`.
    ///
    /// True iff [`time_left`](Self::time_left) is present and strictly
    /// positive.
    pub fn exists(&self, group: &str, key: impl ToString) -> Result<bool, StoreError> {
        Ok(self
            .time_left(group, key)?
            .is_some_and(|remaining| remaining > 0.0))
    }

    /// Removes the record under `(group, key)`, live or expired.
    ///
    /// Returns `true` iff a record existed and was removed.
    pub fn delete(&self, group: &str, key: impl ToString) -> Result<bool, StoreError> {
        self.store.delete(&RecordKey::new(group, key))
    }

    /// Number of physically present records, expired-but-unswept included.
    pub fn len(&self) -> Result<usize, StoreError> {
        self.store.len()
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Removes every record.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.clear()
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn clock_now(&self) -> f64 {
        self.clock.now()
    }
}
