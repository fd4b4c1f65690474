use super::types::Entry;
use crate::replication::protocol::ReplicateRequest;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct StoreInner {
    entries: HashMap<String, Entry>,
    global_version: u64,
}

/// Thread-safe versioned key-value map.
///
/// One instance per node. The leader mutates it through the local-write
/// operations; followers mutate it only through `apply_remote`. The counter
/// starts at 0 and never resets, so version 0 is never assigned to a key.
pub struct VersionedStore {
    inner: Mutex<StoreInner>,
}

impl VersionedStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
        }
    }

    // Nothing can panic while the lock is held, but don't let a poisoned
    // mutex take the whole node down either.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Allocates the next global version and stores the value under it.
    /// Leader-only; returns the assigned version.
    pub fn apply_local_write(&self, key: &str, value: &str) -> u64 {
        let mut inner = self.lock();
        inner.global_version += 1;
        let version = inner.global_version;
        inner.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                version,
            },
        );
        version
    }

    /// Removes a key, consuming the next global version. Leader-only.
    /// Returns `None` without touching the counter when the key is absent.
    pub fn apply_local_delete(&self, key: &str) -> Option<u64> {
        let mut inner = self.lock();
        if !inner.entries.contains_key(key) {
            return None;
        }
        inner.global_version += 1;
        let version = inner.global_version;
        inner.entries.remove(key);
        Some(version)
    }

    /// Applies a replication message per the monotonic version rule:
    /// accept iff the key is absent or `msg.version` is at least the stored
    /// version. Follower-only. Returns whether local state changed.
    ///
    /// The whole read-modify-write runs under the store mutex; two messages
    /// for the same key can never interleave.
    pub fn apply_remote(&self, msg: &ReplicateRequest) -> bool {
        let mut inner = self.lock();

        if let Some(existing) = inner.entries.get(&msg.key) {
            if msg.version < existing.version {
                tracing::debug!(
                    "Dropping stale replication for '{}': version {} < {}",
                    msg.key,
                    msg.version,
                    existing.version
                );
                return false;
            }
        }

        if msg.delete {
            return inner.entries.remove(&msg.key).is_some();
        }

        let Some(value) = msg.value.as_ref() else {
            tracing::warn!("Replication message for '{}' carries no value", msg.key);
            return false;
        };

        inner.entries.insert(
            msg.key.clone(),
            Entry {
                value: value.clone(),
                version: msg.version,
            },
        );
        true
    }

    /// Snapshot of one entry.
    pub fn read(&self, key: &str) -> Option<Entry> {
        self.lock().entries.get(key).cloned()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Highest version allocated so far (0 before the first write).
    pub fn current_version(&self) -> u64 {
        self.lock().global_version
    }
}

impl Default for VersionedStore {
    fn default() -> Self {
        Self::new()
    }
}
