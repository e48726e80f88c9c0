//! # Reconciler: one sweep over the tracked id range.
//!
//! [`Reconciler::sweep`] applies the build-status state machine to every
//! id in `[1, count)`, calling the upstream source and the artifact
//! builder, and mutating the [`BuildStatusStore`] it exclusively owns.
//!
//! ## Sweep flow
//! ```text
//! sweep_at(now):
//!   lock guard (held for the whole sweep)
//!   count() ── Err ──► publish SweepSkipped, return (nothing mutated)
//!      │
//!   for id in 1..count (ascending, sequential):
//!      ├─ ensure status {updates_left: budget, success: false, last_update: 0}
//!      ├─ success && updates_left > 0 && now - last_update ≥ backfill_after
//!      │     └─► success = false, updates_left -= 1   (forced rebuild)
//!      └─ !success:
//!           fetch(id) ── Err ──► errors += 1, continue (status untouched)
//!           decode (infallible)
//!           create(id, .., overwrite=true) ── Err ──► errors += 1, continue
//!           └─ Ok ──► success = true, last_update = now
//!   publish SweepCompleted {count, built, errors}
//! ```
//!
//! ## Rules
//! - Transient failures never escalate: `sweep` has no error return.
//! - A failing id is retried on every future sweep, no cap, no backoff;
//!   the backfill budget only governs re-checks of *successful* ids.
//! - `success && updates_left == 0` is permanently stable: no elapsed
//!   time triggers another build.
//! - The error counter past `error_warn_threshold` is diagnostic only
//!   (a single `ErrorsAboveThreshold` event per sweep); it never stops
//!   or alters the loop.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use crate::artifact::ArtifactBuilder;
use crate::config::Config;
use crate::domain::decode;
use crate::events::{Bus, Event, EventKind};
use crate::reconcile::status::{BuildStatus, BuildStatusStore};
use crate::upstream::EntitySource;

/// Executes sweeps over the tracked id range, mutating the build-status
/// store it exclusively owns.
///
/// The store sits behind a single async-aware mutex acquired for the
/// full duration of a sweep (and held across the upstream/builder
/// awaits). That mutex is the global sweep guard: no two sweeps can
/// overlap, whichever context triggers them.
pub struct Reconciler {
    source: Arc<dyn EntitySource>,
    builder: Arc<dyn ArtifactBuilder>,
    store: Mutex<BuildStatusStore>,
    bus: Bus,
    backfill_after: i64,
    backfill_budget: u8,
    error_warn_threshold: u64,
}

impl Reconciler {
    /// Creates a reconciler with an empty store.
    pub fn new(
        cfg: &Config,
        source: Arc<dyn EntitySource>,
        builder: Arc<dyn ArtifactBuilder>,
        bus: Bus,
    ) -> Self {
        Self {
            source,
            builder,
            store: Mutex::new(BuildStatusStore::new()),
            bus,
            backfill_after: cfg.backfill_after_secs(),
            backfill_budget: cfg.backfill_budget,
            error_warn_threshold: cfg.error_warn_threshold,
        }
    }

    /// Pre-registers every id in `[1, count)` with a zero backfill
    /// budget.
    ///
    /// Called once at startup. Ids seeded here are built on the first
    /// sweep like any other pending id, but once built they are never
    /// force-rebuilt — only ids first seen *during* a sweep receive the
    /// full budget.
    pub async fn seed(&self, count: u64) {
        let mut store = self.store.lock().await;
        for id in 1..count {
            store.ensure(id, BuildStatus::pending(0));
        }
    }

    /// Runs one sweep at the current wall-clock time.
    pub async fn sweep(&self) {
        self.sweep_at(unix_now()).await;
    }

    /// Runs one sweep with an explicit notion of "now" (unix seconds).
    ///
    /// Never returns an error: a failed upstream count skips the whole
    /// sweep with no state mutation, per-id failures are counted and
    /// skipped. Both are retried on the next tick.
    pub async fn sweep_at(&self, now: i64) {
        let mut store = self.store.lock().await;
        self.bus.publish(Event::new(EventKind::SweepStarted));

        let count = match self.source.count().await {
            Ok(count) => count,
            Err(e) => {
                self.bus
                    .publish(Event::new(EventKind::SweepSkipped).with_reason(e.to_string()));
                return;
            }
        };

        // A successful build older than this is eligible for backfill.
        let threshold = now - self.backfill_after;

        let mut built: u64 = 0;
        let mut errors: u64 = 0;
        let mut warned = false;

        for id in 1..count {
            if errors > self.error_warn_threshold && !warned {
                warned = true;
                self.bus
                    .publish(Event::new(EventKind::ErrorsAboveThreshold).with_errors(errors));
            }

            let mut status = store.ensure(id, BuildStatus::pending(self.backfill_budget));

            // Already built, budget remaining, and old enough: mark it
            // pending again to force a backfill.
            if status.success && status.updates_left > 0 && status.last_update <= threshold {
                status = BuildStatus {
                    updates_left: status.updates_left - 1,
                    last_update: status.last_update,
                    success: false,
                };
                store.set(id, status);
                self.bus.publish(
                    Event::new(EventKind::BackfillScheduled)
                        .with_entity(id)
                        .with_updates_left(status.updates_left),
                );
            }

            if !status.success {
                let raw = match self.source.fetch(id).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        errors += 1;
                        self.bus.publish(
                            Event::new(EventKind::EntityBuildFailed)
                                .with_entity(id)
                                .with_reason(e.to_string()),
                        );
                        continue;
                    }
                };

                let (entity, attributes) = decode(&raw);

                if let Err(e) = self.builder.create(id, &entity, &attributes, true).await {
                    errors += 1;
                    self.bus.publish(
                        Event::new(EventKind::EntityBuildFailed)
                            .with_entity(id)
                            .with_reason(e.to_string()),
                    );
                    continue;
                }

                store.set(
                    id,
                    BuildStatus {
                        updates_left: status.updates_left,
                        last_update: now,
                        success: true,
                    },
                );
                built += 1;
                self.bus
                    .publish(Event::new(EventKind::EntityBuilt).with_entity(id));
            }
        }

        self.bus.publish(
            Event::new(EventKind::SweepCompleted)
                .with_count(count)
                .with_built(built)
                .with_errors(errors),
        );
    }

    /// Returns the tracked status for `id`, if any.
    ///
    /// Takes the sweep guard briefly; intended for diagnostics and
    /// tests, never called while a sweep holds the guard.
    pub async fn status(&self, id: u64) -> Option<BuildStatus> {
        self.store.lock().await.get(id)
    }

    /// Number of ids tracked so far.
    pub async fn tracked(&self) -> usize {
        self.store.lock().await.len()
    }
}

/// Current wall-clock time in unix seconds.
fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().min(i64::MAX as u64) as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{Attributes, Entity, RawRecord};
    use crate::error::{BuildError, SourceError};

    /// Upstream stub with injectable count/fetch failures.
    struct FakeSource {
        count: AtomicU64,
        count_fails: AtomicBool,
        fail_fetch: StdMutex<HashSet<u64>>,
        fetches: AtomicU64,
    }

    impl FakeSource {
        fn with_count(count: u64) -> Arc<Self> {
            Arc::new(Self {
                count: AtomicU64::new(count),
                count_fails: AtomicBool::new(false),
                fail_fetch: StdMutex::new(HashSet::new()),
                fetches: AtomicU64::new(0),
            })
        }

        fn fail_fetch_for(&self, id: u64) {
            self.fail_fetch.lock().unwrap().insert(id);
        }
    }

    #[async_trait]
    impl EntitySource for FakeSource {
        async fn count(&self) -> Result<u64, SourceError> {
            if self.count_fails.load(Ordering::SeqCst) {
                return Err(SourceError::Call {
                    error: "rpc down".into(),
                });
            }
            Ok(self.count.load(Ordering::SeqCst))
        }

        async fn fetch(&self, id: u64) -> Result<RawRecord, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch.lock().unwrap().contains(&id) {
                return Err(SourceError::Call {
                    error: format!("no record for {id}"),
                });
            }
            Ok(RawRecord {
                name: format!("entity-{id}"),
                genotype: "01020304".into(),
            })
        }
    }

    /// Builder stub recording every create call.
    #[derive(Default)]
    struct FakeBuilder {
        fail_ids: StdMutex<HashSet<u64>>,
        created: StdMutex<Vec<u64>>,
    }

    impl FakeBuilder {
        fn arc() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn fail_for(&self, id: u64) {
            self.fail_ids.lock().unwrap().insert(id);
        }

        fn recover(&self, id: u64) {
            self.fail_ids.lock().unwrap().remove(&id);
        }

        fn created(&self) -> Vec<u64> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtifactBuilder for FakeBuilder {
        async fn create(
            &self,
            id: u64,
            _entity: &Entity,
            _attributes: &Attributes,
            overwrite: bool,
        ) -> Result<(), BuildError> {
            assert!(overwrite, "sweep must always force overwrite");
            if self.fail_ids.lock().unwrap().contains(&id) {
                return Err(BuildError::Create {
                    error: "upload rejected".into(),
                });
            }
            self.created.lock().unwrap().push(id);
            Ok(())
        }
    }

    fn reconciler(
        source: &Arc<FakeSource>,
        builder: &Arc<FakeBuilder>,
        budget: u8,
    ) -> Reconciler {
        let cfg = Config {
            backfill_budget: budget,
            ..Config::default()
        };
        Reconciler::new(
            &cfg,
            source.clone() as Arc<dyn EntitySource>,
            builder.clone() as Arc<dyn ArtifactBuilder>,
            Bus::new(cfg.bus_capacity_clamped()),
        )
    }

    #[tokio::test]
    async fn test_new_id_registered_with_budget_before_build() {
        let source = FakeSource::with_count(2);
        let builder = FakeBuilder::arc();
        builder.fail_for(1);
        let rec = reconciler(&source, &builder, 10);

        rec.sweep_at(100).await;

        // Build failed, so the status must still be the fresh
        // registration: full budget, never built.
        assert_eq!(rec.status(1).await, Some(BuildStatus::pending(10)));
    }

    #[tokio::test]
    async fn test_first_build_marks_success() {
        let source = FakeSource::with_count(2);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 10);

        rec.sweep_at(100).await;

        assert_eq!(
            rec.status(1).await,
            Some(BuildStatus {
                updates_left: 10,
                last_update: 100,
                success: true,
            })
        );
        assert_eq!(builder.created(), vec![1]);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent_without_elapsed_time() {
        let source = FakeSource::with_count(4);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 10);

        rec.sweep_at(100).await;
        let mut snapshot = Vec::new();
        for id in 1..4 {
            snapshot.push(rec.status(id).await);
        }

        rec.sweep_at(100).await;
        for (i, id) in (1..4).enumerate() {
            assert_eq!(rec.status(id).await, snapshot[i]);
        }
        // No duplicate build calls for already-successful ids.
        assert_eq!(builder.created(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_exhausted_budget_is_permanently_stable() {
        let source = FakeSource::with_count(2);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 10);

        // Startup-seeded ids carry a zero budget.
        rec.seed(2).await;
        assert_eq!(rec.status(1).await, Some(BuildStatus::pending(0)));

        rec.sweep_at(100).await;
        assert_eq!(builder.created(), vec![1]);

        // Arbitrarily far in the future: no backfill, no build call.
        rec.sweep_at(1_000_000).await;
        assert_eq!(builder.created(), vec![1]);
        assert_eq!(
            rec.status(1).await,
            Some(BuildStatus {
                updates_left: 0,
                last_update: 100,
                success: true,
            })
        );
    }

    #[tokio::test]
    async fn test_backfill_timing_scenario() {
        // Entity built at t0 with a budget of 3; per the forced-rebuild
        // rule a sweep 61s later decrements the budget and re-builds.
        let t0 = 1_000;
        let source = FakeSource::with_count(2);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 3);

        rec.sweep_at(t0).await;
        assert_eq!(
            rec.status(1).await,
            Some(BuildStatus {
                updates_left: 3,
                last_update: t0,
                success: true,
            })
        );

        // Builder down at t0+61: the forced-rebuild transition is
        // observable because the rebuild itself fails.
        builder.fail_for(1);
        rec.sweep_at(t0 + 61).await;
        assert_eq!(
            rec.status(1).await,
            Some(BuildStatus {
                updates_left: 2,
                last_update: t0,
                success: false,
            })
        );

        // Builder back at t0+65: pending id rebuilt, budget unchanged.
        builder.recover(1);
        rec.sweep_at(t0 + 65).await;
        assert_eq!(
            rec.status(1).await,
            Some(BuildStatus {
                updates_left: 2,
                last_update: t0 + 65,
                success: true,
            })
        );
    }

    #[tokio::test]
    async fn test_backfill_rebuilds_within_same_sweep_when_builder_healthy() {
        let t0 = 1_000;
        let source = FakeSource::with_count(2);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 3);

        rec.sweep_at(t0).await;
        rec.sweep_at(t0 + 61).await;

        // The same sweep that schedules the backfill performs it.
        assert_eq!(builder.created(), vec![1, 1]);
        assert_eq!(
            rec.status(1).await,
            Some(BuildStatus {
                updates_left: 2,
                last_update: t0 + 61,
                success: true,
            })
        );
    }

    #[tokio::test]
    async fn test_no_backfill_before_threshold() {
        let t0 = 1_000;
        let source = FakeSource::with_count(2);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 3);

        rec.sweep_at(t0).await;
        rec.sweep_at(t0 + 59).await;

        assert_eq!(builder.created(), vec![1]);
        assert_eq!(
            rec.status(1).await,
            Some(BuildStatus {
                updates_left: 3,
                last_update: t0,
                success: true,
            })
        );
    }

    #[tokio::test]
    async fn test_per_id_failure_is_isolated() {
        let source = FakeSource::with_count(4);
        let builder = FakeBuilder::arc();
        builder.fail_for(2);
        let rec = reconciler(&source, &builder, 10);

        rec.sweep_at(100).await;

        // Id 2 stays pending; ids 1 and 3 were still processed.
        assert_eq!(rec.status(2).await, Some(BuildStatus::pending(10)));
        assert_eq!(builder.created(), vec![1, 3]);
        assert!(rec.status(1).await.unwrap().success);
        assert!(rec.status(3).await.unwrap().success);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_isolated() {
        let source = FakeSource::with_count(4);
        source.fail_fetch_for(3);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 10);

        rec.sweep_at(100).await;

        assert_eq!(rec.status(3).await, Some(BuildStatus::pending(10)));
        assert_eq!(builder.created(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_count_failure_mutates_nothing() {
        let source = FakeSource::with_count(3);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 10);

        rec.sweep_at(100).await;
        let before: Vec<_> = vec![rec.status(1).await, rec.status(2).await];

        source.count_fails.store(true, Ordering::SeqCst);
        // Far enough in the future that a backfill would trigger if the
        // sweep ran.
        rec.sweep_at(100_000).await;

        assert_eq!(vec![rec.status(1).await, rec.status(2).await], before);
        assert_eq!(builder.created(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_range_excludes_zero_and_count() {
        let source = FakeSource::with_count(3);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 10);

        rec.sweep_at(100).await;

        assert_eq!(rec.status(0).await, None);
        assert_eq!(rec.status(3).await, None);
        assert_eq!(rec.tracked().await, 2);
    }

    #[tokio::test]
    async fn test_tracked_ids_survive_count_shrink() {
        let source = FakeSource::with_count(4);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 10);

        rec.sweep_at(100).await;
        assert_eq!(rec.tracked().await, 3);

        // Upstream reorg reports a smaller count; tracked ids remain.
        source.count.store(2, Ordering::SeqCst);
        rec.sweep_at(200).await;
        assert_eq!(rec.tracked().await, 3);
        assert!(rec.status(3).await.is_some());
    }

    #[tokio::test]
    async fn test_growing_count_registers_new_ids_with_budget() {
        let source = FakeSource::with_count(2);
        let builder = FakeBuilder::arc();
        let rec = reconciler(&source, &builder, 10);
        rec.seed(2).await;

        rec.sweep_at(100).await;
        source.count.store(4, Ordering::SeqCst);
        builder.fail_for(2);
        builder.fail_for(3);
        rec.sweep_at(200).await;

        // Startup-seeded id kept its zero budget; sweep-discovered ids
        // got the full one.
        assert_eq!(rec.status(1).await.unwrap().updates_left, 0);
        assert_eq!(rec.status(2).await, Some(BuildStatus::pending(10)));
        assert_eq!(rec.status(3).await, Some(BuildStatus::pending(10)));
    }

    #[tokio::test]
    async fn test_error_threshold_is_diagnostic_only() {
        let source = FakeSource::with_count(10);
        for id in 1..10 {
            source.fail_fetch_for(id);
        }
        let builder = FakeBuilder::arc();

        let cfg = Config::default();
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let mut rx = bus.subscribe();
        let rec = Reconciler::new(
            &cfg,
            source.clone() as Arc<dyn EntitySource>,
            builder.clone() as Arc<dyn ArtifactBuilder>,
            bus,
        );

        rec.sweep_at(100).await;

        // Every id was still visited despite crossing the threshold.
        assert_eq!(source.fetches.load(Ordering::SeqCst), 9);

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert!(kinds.contains(&EventKind::ErrorsAboveThreshold));
        let completed = kinds
            .iter()
            .filter(|k| **k == EventKind::SweepCompleted)
            .count();
        assert_eq!(completed, 1);
    }
}
