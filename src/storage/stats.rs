//! Record Statistics
//!
//! A full-table pass over record metadata, counting live and expired
//! records globally and per group. Unlike the sweep, correctness here
//! requires looking at every record, so there is no early termination.

use std::collections::HashMap;

use serde::Serialize;

use crate::storage::engine::ExpiryEngine;
use crate::storage::store::{RecordStore, StoreError};

/// Counts for one logical group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    pub total: u64,
    pub active: u64,
    pub expired: u64,
}

/// Store-wide counts with a per-group breakdown.
///
/// `total == active + expired`; `expired` counts records whose lifetime has
/// elapsed but that the sweeper has not yet reclaimed. Serializable so
/// embedders can export a snapshot directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub total: u64,
    pub active: u64,
    pub expired: u64,
    pub by_group: HashMap<String, GroupStats>,
}

impl<S: RecordStore> ExpiryEngine<S> {
    /// Counts every record against one clock reading.
    ///
    /// An empty store yields all-zero counts and an empty breakdown.
    pub fn get_stats(&self) -> Result<StoreStats, StoreError> {
        let now = self.clock_now();
        let mut stats = StoreStats::default();

        for meta in self.store().scan_all()? {
            let expired = meta.is_expired(now);
            let group = stats.by_group.entry(meta.key.group).or_default();
            group.total += 1;
            stats.total += 1;

            if expired {
                group.expired += 1;
                stats.expired += 1;
            } else {
                group.active += 1;
                stats.active += 1;
            }
        }

        Ok(stats)
    }
}
