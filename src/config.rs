//! # Global worker configuration.
//!
//! Provides [`Config`] centralized settings for the reconciliation worker.
//!
//! Config is consumed in two places:
//! 1. **Supervisor creation**: `Supervisor::new(config, ...)` — lifecycle
//!    timings (settle delay, sweep interval, shutdown grace).
//! 2. **Reconciler construction**: backfill budget/threshold and the
//!    diagnostic error threshold for a single sweep.
//!
//! ## Sentinel values
//! - `bus_capacity` is clamped to a minimum of 1 by the bus.
//! - `error_warn_threshold` is diagnostic only; crossing it never stops
//!   or alters a sweep.

use std::time::Duration;

/// Configuration for the reconciliation worker.
///
/// ## Field semantics
/// - `interval`: delay between periodic sweeps
/// - `grace`: maximum wait for the ticker task during shutdown
/// - `settle`: one-time startup delay before the first upstream call
/// - `backfill_after`: minimum age of a successful build before a forced
///   rebuild is allowed
/// - `backfill_budget`: forced rebuilds granted to ids first seen during
///   a sweep (ids seeded at startup get a budget of 0)
/// - `error_warn_threshold`: per-sweep error count past which a warning
///   event is emitted (non-enforcing)
/// - `bus_capacity`: event bus ring buffer size
#[derive(Clone, Debug)]
pub struct Config {
    /// Delay between periodic sweeps.
    pub interval: Duration,

    /// Maximum time to wait for the ticker task to stop during shutdown.
    ///
    /// When the interrupt signal is received:
    /// - The ticker is cancelled via `CancellationToken`
    /// - The supervisor waits up to `grace` for it to finish
    /// - Past the deadline the process exits anyway; an unfinished sweep
    ///   is orphaned, not treated as an error
    pub grace: Duration,

    /// One-time delay before the initial upstream count, giving the
    /// network stack time to settle after process start.
    pub settle: Duration,

    /// Minimum age of the last successful build before an entity with
    /// remaining budget is forced to rebuild.
    pub backfill_after: Duration,

    /// Forced-rebuild budget granted when an id is first registered
    /// during a sweep.
    ///
    /// Ids pre-registered at startup get a budget of 0 instead: once
    /// built they are never force-rebuilt.
    pub backfill_budget: u8,

    /// Per-sweep error count past which [`EventKind::ErrorsAboveThreshold`]
    /// is emitted. The sweep continues regardless.
    ///
    /// [`EventKind::ErrorsAboveThreshold`]: crate::EventKind::ErrorsAboveThreshold
    pub error_warn_threshold: u64,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// will skip older items. Minimum value is 1 (enforced by the bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the backfill threshold in whole seconds, the unit the
    /// build-status timestamps are kept in.
    #[inline]
    pub fn backfill_after_secs(&self) -> i64 {
        self.backfill_after.as_secs().min(i64::MAX as u64) as i64
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `interval = 10s` (sweep cadence)
    /// - `grace = 15s` (shutdown deadline)
    /// - `settle = 2s` (startup network settle)
    /// - `backfill_after = 60s` (age before a forced rebuild)
    /// - `backfill_budget = 10` (forced rebuilds per sweep-registered id)
    /// - `error_warn_threshold = 5` (diagnostic only)
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            grace: Duration::from_secs(15),
            settle: Duration::from_secs(2),
            backfill_after: Duration::from_secs(60),
            backfill_budget: 10,
            error_warn_threshold: 5,
            bus_capacity: 1024,
        }
    }
}
