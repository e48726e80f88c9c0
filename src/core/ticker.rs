//! # Ticker: the timer-driven sweep task.
//!
//! [`Ticker::run`] is the body of the single background task: it fires
//! on a fixed interval and invokes [`Reconciler::sweep`] on each tick.
//!
//! ## Cancellation semantics
//! The stop token is observed at **safe points only** — between ticks,
//! never mid-sweep. A sweep that is already executing when the token is
//! cancelled runs to completion; the supervisor bounds how long it is
//! willing to wait for that.
//!
//! ```text
//! loop {
//!   select! {
//!     token.cancelled() ──► publish TickerStopped, return
//!     interval.tick()   ──► reconciler.sweep().await   (not cancellable)
//!   }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::reconcile::Reconciler;

/// Timer-driven task that runs one sweep per tick until cancelled.
pub struct Ticker {
    reconciler: Arc<Reconciler>,
    interval: Duration,
    bus: Bus,
}

impl Ticker {
    /// Creates a ticker over the given reconciler.
    pub fn new(reconciler: Arc<Reconciler>, interval: Duration, bus: Bus) -> Self {
        Self {
            reconciler,
            interval,
            bus,
        }
    }

    /// Runs until the stop token is observed between ticks.
    ///
    /// The first tick fires one full interval after start (not
    /// immediately); a sweep that overruns the interval delays the next
    /// tick rather than bunching missed ones.
    pub async fn run(self, token: CancellationToken) {
        let start = Instant::now() + self.interval;
        let mut ticks = time::interval_at(start, self.interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    self.bus.publish(Event::new(EventKind::TickerStopped));
                    return;
                }
                _ = ticks.tick() => {
                    self.reconciler.sweep().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::artifact::ArtifactBuilder;
    use crate::config::Config;
    use crate::domain::{Attributes, Entity, RawRecord};
    use crate::error::{BuildError, SourceError};
    use crate::upstream::EntitySource;

    /// Source over an empty range, counting how often it is polled.
    struct CountingSource {
        polls: AtomicU64,
    }

    #[async_trait]
    impl EntitySource for CountingSource {
        async fn count(&self) -> Result<u64, SourceError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        }

        async fn fetch(&self, _id: u64) -> Result<RawRecord, SourceError> {
            Err(SourceError::Call {
                error: "empty range".into(),
            })
        }
    }

    struct NullBuilder;

    #[async_trait]
    impl ArtifactBuilder for NullBuilder {
        async fn create(
            &self,
            _id: u64,
            _entity: &Entity,
            _attributes: &Attributes,
            _overwrite: bool,
        ) -> Result<(), BuildError> {
            Ok(())
        }
    }

    fn ticker(interval: Duration) -> (Ticker, Arc<CountingSource>) {
        let cfg = Config::default();
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let source = Arc::new(CountingSource {
            polls: AtomicU64::new(0),
        });
        let reconciler = Arc::new(Reconciler::new(
            &cfg,
            source.clone() as Arc<dyn EntitySource>,
            Arc::new(NullBuilder) as Arc<dyn ArtifactBuilder>,
            bus.clone(),
        ));
        (Ticker::new(reconciler, interval, bus), source)
    }

    #[tokio::test]
    async fn test_ticker_sweeps_on_each_tick() {
        let (ticker, source) = ticker(Duration::from_millis(10));
        let token = CancellationToken::new();
        let handle = tokio::spawn(ticker.run(token.clone()));

        tokio::time::sleep(Duration::from_millis(80)).await;
        token.cancel();
        handle.await.unwrap();

        assert!(source.polls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_ticker_stops_well_within_grace() {
        // Interrupt while no sweep is in flight: the task must observe
        // the token and exit far below the 15s shutdown deadline.
        let (ticker, _source) = ticker(Duration::from_secs(3600));
        let token = CancellationToken::new();
        let handle = tokio::spawn(ticker.run(token.clone()));

        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(joined.is_ok(), "ticker did not stop within the deadline");
    }

    #[tokio::test]
    async fn test_ticker_does_not_sweep_before_first_interval() {
        let (ticker, source) = ticker(Duration::from_secs(3600));
        let token = CancellationToken::new();
        let handle = tokio::spawn(ticker.run(token.clone()));

        tokio::time::sleep(Duration::from_millis(30)).await;
        token.cancel();
        handle.await.unwrap();

        assert_eq!(source.polls.load(Ordering::SeqCst), 0);
    }
}
