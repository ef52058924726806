//! Record Store Boundary
//!
//! The engine and the sweeper talk to durable storage through the
//! [`RecordStore`] trait: atomic single-key operations, one ordered scan
//! over `(created, ttl)` for the sweep, and one unordered scan for stats.
//! Any backend that can honor those operations works; [`MemoryStore`] is
//! the in-process implementation backed by a `HashMap` plus a `BTreeSet`
//! expiry index.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use crate::storage::record::{Record, RecordKey, RecordMeta};

/// A fault in the storage collaborator.
///
/// Ordinary outcomes ("not found", "still live") are never errors; they are
/// encoded in `Option`/`bool` results. Only backend failures surface here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store can no longer serve requests.
    #[error("record store unavailable: {0}")]
    Backend(String),
}

/// Keyed storage with expiry-aware scan support.
///
/// Implementations must guarantee that each method is atomic at the
/// single-record granularity: a concurrent reader never observes a torn
/// write, and the check inside [`put_if_expired`](Self::put_if_expired) and
/// [`delete_if_created`](Self::delete_if_created) happens in the same
/// critical section as the mutation.
pub trait RecordStore: Send + Sync {
    /// Writes a record unconditionally, replacing any existing one.
    fn put(&self, key: RecordKey, record: Record) -> Result<(), StoreError>;

    /// Writes a record unless a live one already occupies the key.
    ///
    /// Returns `false` and leaves the existing record untouched when it is
    /// still live at `now`; otherwise writes (overwriting an expired
    /// record in place) and returns `true`.
    fn put_if_expired(&self, key: RecordKey, record: Record, now: f64) -> Result<bool, StoreError>;

    /// Reads a record regardless of liveness.
    fn get(&self, key: &RecordKey) -> Result<Option<Record>, StoreError>;

    /// Removes a record regardless of liveness. Returns whether one existed.
    fn delete(&self, key: &RecordKey) -> Result<bool, StoreError>;

    /// Removes a record only if its `created` timestamp still matches.
    ///
    /// A record that was overwritten since `created` was observed is left
    /// alone and `false` is returned.
    fn delete_if_created(&self, key: &RecordKey, created: f64) -> Result<bool, StoreError>;

    /// Snapshot of all record metadata in ascending `(created, ttl)` order.
    fn scan_expiry_order(&self) -> Result<Vec<RecordMeta>, StoreError>;

    /// Snapshot of all record metadata, unordered.
    fn scan_all(&self) -> Result<Vec<RecordMeta>, StoreError>;

    /// Number of physically present records, expired ones included.
    fn len(&self) -> Result<usize, StoreError>;

    /// Removes every record and index entry.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Entry in the expiry index, ordered by `(created, ttl, identity)`.
///
/// Timestamps come from a monotonic clock and are never NaN; `total_cmp`
/// gives the set a total order regardless.
#[derive(Debug, Clone, PartialEq)]
struct IndexKey {
    created: f64,
    ttl: f64,
    key: RecordKey,
}

impl IndexKey {
    fn of(key: &RecordKey, record: &Record) -> Self {
        Self {
            created: record.created,
            ttl: record.ttl,
            key: key.clone(),
        }
    }
}

impl Eq for IndexKey {}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.created
            .total_cmp(&other.created)
            .then_with(|| self.ttl.total_cmp(&other.ttl))
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<RecordKey, Record>,
    expiry_index: BTreeSet<IndexKey>,
}

/// In-memory [`RecordStore`].
///
/// A single `RwLock` guards the record map and the expiry index together,
/// so every write keeps both in sync within one critical section. A
/// poisoned lock (a writer panicked) is reported as
/// [`StoreError::Backend`] rather than propagating the panic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl RecordStore for MemoryStore {
    fn put(&self, key: RecordKey, record: Record) -> Result<(), StoreError> {
        let mut guard = self.write()?;
        let inner = &mut *guard;

        if let Some(old) = inner.records.get(&key) {
            let stale = IndexKey::of(&key, old);
            inner.expiry_index.remove(&stale);
        }
        inner.expiry_index.insert(IndexKey::of(&key, &record));
        inner.records.insert(key, record);
        Ok(())
    }

    fn put_if_expired(&self, key: RecordKey, record: Record, now: f64) -> Result<bool, StoreError> {
        let mut guard = self.write()?;
        let inner = &mut *guard;

        if let Some(existing) = inner.records.get(&key) {
            if existing.is_live(now) {
                return Ok(false);
            }
            let stale = IndexKey::of(&key, existing);
            inner.expiry_index.remove(&stale);
        }
        inner.expiry_index.insert(IndexKey::of(&key, &record));
        inner.records.insert(key, record);
        Ok(true)
    }

    fn get(&self, key: &RecordKey) -> Result<Option<Record>, StoreError> {
        Ok(self.read()?.records.get(key).cloned())
    }

    fn delete(&self, key: &RecordKey) -> Result<bool, StoreError> {
        let mut guard = self.write()?;
        let inner = &mut *guard;

        match inner.records.remove(key) {
            Some(old) => {
                inner.expiry_index.remove(&IndexKey::of(key, &old));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_if_created(&self, key: &RecordKey, created: f64) -> Result<bool, StoreError> {
        let mut guard = self.write()?;
        let inner = &mut *guard;

        match inner.records.get(key) {
            Some(existing) if existing.created == created => {
                let stale = IndexKey::of(key, existing);
                inner.expiry_index.remove(&stale);
                inner.records.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn scan_expiry_order(&self) -> Result<Vec<RecordMeta>, StoreError> {
        Ok(self
            .read()?
            .expiry_index
            .iter()
            .map(|ix| RecordMeta {
                key: ix.key.clone(),
                created: ix.created,
                ttl: ix.ttl,
            })
            .collect())
    }

    fn scan_all(&self) -> Result<Vec<RecordMeta>, StoreError> {
        Ok(self
            .read()?
            .records
            .iter()
            .map(|(key, record)| RecordMeta {
                key: key.clone(),
                created: record.created,
                ttl: record.ttl,
            })
            .collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.records.len())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.write()?;
        guard.records.clear();
        guard.expiry_index.clear();
        Ok(())
    }
}
