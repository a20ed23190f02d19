use dashmap::DashSet;

use crate::models::Address;

/// Identifies one recording: a transaction hash under a given address.
///
/// Keying on the address as well as the hash lets the same on-chain
/// transaction be recorded once for its sender and once for its receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub address: Address,
    pub hash: String,
}

impl RecordKey {
    pub fn new(address: impl Into<Address>, hash: &str) -> Self {
        Self {
            address: address.into(),
            hash: hash.trim().to_lowercase(),
        }
    }
}

/// Set of recordings already persisted during this process lifetime
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen: DashSet<RecordKey>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recorded(&self, key: &RecordKey) -> bool {
        self.seen.contains(key)
    }

    /// Idempotently mark `key` as seen
    pub fn mark_recorded(&self, key: RecordKey) {
        self.seen.insert(key);
    }

    /// Atomic insert-if-absent. Exactly one of any number of concurrent
    /// callers with the same key gets `true`.
    pub fn try_mark(&self, key: RecordKey) -> bool {
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
