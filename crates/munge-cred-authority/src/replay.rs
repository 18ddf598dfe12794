//! Replay cache: each token may be decoded once while it is valid.
//!
//! Entries are keyed by a blake3 digest of the sealed envelope and kept
//! until the token itself would expire; after that the TTL check rejects
//! the token anyway, so the entry can go.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Thread-safe set of consumed token digests.
#[derive(Debug, Default)]
pub struct ReplayCache {
    entries: Mutex<HashMap<[u8; 32], i64>>,
}

impl ReplayCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a digest as consumed.
    ///
    /// Returns `false` if the digest was already consumed and has not yet
    /// expired. Expired entries are purged as a side effect.
    pub fn insert(&self, digest: [u8; 32], expires_at: i64, now: i64) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, &mut expiry| expiry >= now);

        if entries.contains_key(&digest) {
            return false;
        }
        entries.insert(digest, expires_at);
        true
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_insert_is_replay() {
        let cache = ReplayCache::new();
        assert!(cache.insert([1; 32], 100, 10));
        assert!(!cache.insert([1; 32], 100, 20));
        assert!(cache.insert([2; 32], 100, 20));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_expired_entries_are_purged() {
        let cache = ReplayCache::new();
        assert!(cache.insert([1; 32], 100, 10));
        assert!(cache.insert([2; 32], 500, 200));
        assert_eq!(cache.len(), 1);
    }
}
