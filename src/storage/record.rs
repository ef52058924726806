use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Compound identity of a record: a logical group name plus a key within it.
///
/// Keys are always stored in string form. Callers may pass any displayable
/// key type to the engine; `42` and `"42"` name the same record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub group: String,
    pub key: String,
}

impl RecordKey {
    pub fn new(group: impl Into<String>, key: impl ToString) -> Self {
        Self {
            group: group.into(),
            key: key.to_string(),
        }
    }
}

/// A stored value with its expiry metadata.
///
/// Liveness is never stored as a flag; it is derived from `created` and
/// `ttl` against the current clock reading. `created` and `ttl` are written
/// together and only change when a record is overwritten after expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The stored payload. Marker records hold `Value::Bool(true)`.
    pub value: Value,
    /// Clock reading at the time this record was written, in seconds.
    pub created: f64,
    /// Lifetime in seconds from `created`.
    pub ttl: f64,
}

impl Record {
    pub fn new(value: Value, created: f64, ttl: f64) -> Self {
        Self {
            value,
            created,
            ttl,
        }
    }

    /// Whether this record is still live at the given clock reading.
    ///
    /// Strict comparison: at the exact instant `now - created == ttl` the
    /// record is already expired.
    #[inline]
    pub fn is_live(&self, now: f64) -> bool {
        now - self.created < self.ttl
    }

    /// Seconds of lifetime remaining at the given clock reading.
    ///
    /// Never negative: an expired record that has not been swept yet
    /// reports `0.0`.
    pub fn time_left(&self, now: f64) -> f64 {
        (self.ttl - (now - self.created)).max(0.0)
    }
}

/// Identity and expiry metadata of a record, without its payload.
///
/// This is what index scans and the stats pass carry around, so neither
/// has to clone payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMeta {
    pub key: RecordKey,
    pub created: f64,
    pub ttl: f64,
}

impl RecordMeta {
    #[inline]
    pub fn is_expired(&self, now: f64) -> bool {
        now - self.created >= self.ttl
    }
}
