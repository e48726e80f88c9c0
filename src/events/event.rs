//! # Events emitted by the worker.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Lifecycle events**: worker startup and shutdown progress
//! - **Sweep events**: one full pass over the tracked id range
//! - **Entity events**: per-id build outcomes
//!
//! The [`Event`] struct carries optional metadata such as the entity id,
//! the observed range count, per-sweep totals and failure reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that
//! increases monotonically. Use `seq` to restore the exact order when
//! events are delivered out of order.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of worker events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Lifecycle events ===
    /// Worker finished startup: store seeded, ticker running.
    ///
    /// Sets: `count` (initial observed range bound).
    WorkerStarted,

    /// Interrupt signal observed; cooperative shutdown begins.
    ShutdownRequested,

    /// The ticker task observed the stop token and exited.
    TickerStopped,

    /// The ticker task finished within the shutdown grace period.
    StoppedWithinGrace,

    /// Grace period exceeded; the in-flight sweep is orphaned and the
    /// process exits anyway.
    GraceExceeded,

    // === Sweep events ===
    /// A sweep acquired the guard and is starting.
    SweepStarted,

    /// The sweep was skipped because the upstream count failed; no state
    /// was mutated.
    ///
    /// Sets: `reason`.
    SweepSkipped,

    /// The sweep visited every id in range.
    ///
    /// Sets: `count`, `built`, `errors`.
    SweepCompleted,

    /// The sweep-local error counter crossed the warn threshold. The
    /// sweep continues regardless; this is diagnostic only.
    ///
    /// Sets: `errors`.
    ErrorsAboveThreshold,

    // === Entity events ===
    /// An already-built entity was marked for a forced rebuild.
    ///
    /// Sets: `entity`, `updates_left` (remaining budget after the
    /// decrement).
    BackfillScheduled,

    /// The artifact for an entity was built and persisted.
    ///
    /// Sets: `entity`.
    EntityBuilt,

    /// Fetching or building an entity failed; its status is unchanged
    /// and it will be retried next sweep.
    ///
    /// Sets: `entity`, `reason`.
    EntityBuildFailed,
}

/// Worker event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Entity id, if applicable.
    pub entity: Option<u64>,
    /// Observed range bound (`count`); tracked ids are `[1, count)`.
    pub count: Option<u64>,
    /// Artifacts built during this sweep.
    pub built: Option<u64>,
    /// Per-id failures recorded during this sweep.
    pub errors: Option<u64>,
    /// Remaining forced-rebuild budget.
    pub updates_left: Option<u8>,
    /// Human-readable reason (errors, skip causes).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            entity: None,
            count: None,
            built: None,
            errors: None,
            updates_left: None,
            reason: None,
        }
    }

    /// Attaches an entity id.
    #[inline]
    pub fn with_entity(mut self, id: u64) -> Self {
        self.entity = Some(id);
        self
    }

    /// Attaches the observed range bound.
    #[inline]
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches the per-sweep built total.
    #[inline]
    pub fn with_built(mut self, built: u64) -> Self {
        self.built = Some(built);
        self
    }

    /// Attaches the per-sweep error total.
    #[inline]
    pub fn with_errors(mut self, errors: u64) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Attaches the remaining forced-rebuild budget.
    #[inline]
    pub fn with_updates_left(mut self, updates_left: u8) -> Self {
        self.updates_left = Some(updates_left);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::SweepStarted);
        let b = Event::new(EventKind::SweepStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builder_sets_fields() {
        let ev = Event::new(EventKind::EntityBuildFailed)
            .with_entity(7)
            .with_reason("boom");
        assert_eq!(ev.kind, EventKind::EntityBuildFailed);
        assert_eq!(ev.entity, Some(7));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
        assert_eq!(ev.count, None);
    }
}
