//! Per-entity build status and its in-memory store.
//!
//! The store is a plain map wrapper: storage, lookup and
//! insert-if-absent, nothing else. Callers are responsible for holding
//! the sweep guard; the store itself does no locking. State is never
//! persisted — a process restart re-derives it from the upstream source.

use std::collections::HashMap;

/// Build state for one tracked entity id.
///
/// ## Invariants
/// - `updates_left` never increases.
/// - `success == true` implies `last_update` holds the time of the most
///   recent successful build.
/// - `last_update == 0` means never built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildStatus {
    /// Remaining forced rebuilds after a successful build.
    pub updates_left: u8,
    /// Unix seconds of the last successful build; 0 = never.
    pub last_update: i64,
    /// Whether the artifact is currently considered up to date.
    pub success: bool,
}

impl BuildStatus {
    /// Status for an id that has never been built.
    pub fn pending(updates_left: u8) -> Self {
        Self {
            updates_left,
            last_update: 0,
            success: false,
        }
    }
}

/// Mapping from entity id to [`BuildStatus`].
///
/// Entries are only ever added, never removed: the tracked id set grows
/// with the upstream count and never shrinks.
#[derive(Debug, Default)]
pub struct BuildStatusStore {
    entries: HashMap<u64, BuildStatus>,
}

impl BuildStatusStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the status for `id`, if tracked.
    pub fn get(&self, id: u64) -> Option<BuildStatus> {
        self.entries.get(&id).copied()
    }

    /// Replaces the status for `id`.
    pub fn set(&mut self, id: u64, status: BuildStatus) {
        self.entries.insert(id, status);
    }

    /// Inserts `default` only if `id` is absent; returns the status now
    /// tracked for `id`.
    pub fn ensure(&mut self, id: u64, default: BuildStatus) -> BuildStatus {
        *self.entries.entry(id).or_insert(default)
    }

    /// Number of tracked ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any id is tracked yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_untracked_is_none() {
        let store = BuildStatusStore::new();
        assert_eq!(store.get(1), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_ensure_inserts_once() {
        let mut store = BuildStatusStore::new();
        let first = store.ensure(1, BuildStatus::pending(10));
        assert_eq!(first, BuildStatus::pending(10));

        // A second ensure with a different default must not overwrite.
        let second = store.ensure(1, BuildStatus::pending(0));
        assert_eq!(second, BuildStatus::pending(10));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_replaces() {
        let mut store = BuildStatusStore::new();
        store.ensure(3, BuildStatus::pending(10));
        store.set(
            3,
            BuildStatus {
                updates_left: 10,
                last_update: 42,
                success: true,
            },
        );
        let status = store.get(3).unwrap();
        assert!(status.success);
        assert_eq!(status.last_update, 42);
    }
}
