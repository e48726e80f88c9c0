//! # Supervisor: process lifecycle for the reconciliation worker.
//!
//! The [`Supervisor`] owns the event bus, the subscribers, and the
//! reconciler. It seeds the build-status store, launches the ticker
//! task, blocks on the interrupt signal, and performs bounded-grace
//! shutdown.
//!
//! ## Lifecycle
//! ```text
//! run():
//!   sleep(settle)                        startup network settle
//!   count() ── Err ──► RuntimeError::InitialCount   (fatal, caller exits)
//!   reconciler.seed(count)               budget 0 for pre-existing ids
//!   subscriber_listener()                Bus ─► Subscriber fan-out
//!   spawn Ticker(run, token)             one sweep per interval tick
//!   publish WorkerStarted
//!   wait_for_interrupt()                 blocks the main flow
//!   shutdown(token, handle):
//!     publish ShutdownRequested
//!     token.cancel()                     observed between ticks only
//!     timeout(grace, join ticker):
//!       ├─ joined   ─► publish StoppedWithinGrace
//!       ├─ panicked ─► logged distinctly (no grace event)
//!       └─ deadline ─► publish GraceExceeded  (in-flight sweep orphaned)
//!   return Ok(())                        shutdown timeout is not an error
//! ```
//!
//! ## Rules
//! - The initial count failure is the only fatal path; everything after
//!   startup is swallowed below the supervisor.
//! - The stop token is cooperative: an in-flight sweep is never aborted,
//!   only waited for (up to `grace`) or orphaned.
//! - A failed signal registration still runs the full shutdown sequence
//!   (cancel + bounded wait) before the error propagates; the ticker is
//!   never left running behind an early return.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::artifact::ArtifactBuilder;
use crate::config::Config;
use crate::core::{shutdown, ticker::Ticker};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::reconcile::Reconciler;
use crate::subscribers::Subscriber;
use crate::upstream::EntitySource;

/// Coordinates startup, the periodic sweep task, event delivery and
/// graceful shutdown.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    source: Arc<dyn EntitySource>,
    reconciler: Arc<Reconciler>,
    subscribers: Vec<Arc<dyn Subscriber>>,
}

impl Supervisor {
    /// Creates a supervisor wiring the collaborators to a fresh
    /// reconciler and event bus.
    pub fn new(
        cfg: Config,
        source: Arc<dyn EntitySource>,
        builder: Arc<dyn ArtifactBuilder>,
        subscribers: Vec<Arc<dyn Subscriber>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let reconciler = Arc::new(Reconciler::new(&cfg, source.clone(), builder, bus.clone()));
        Self {
            cfg,
            bus,
            source,
            reconciler,
            subscribers,
        }
    }

    /// Shared handle to the reconciler (diagnostics, ad-hoc sweeps).
    pub fn reconciler(&self) -> Arc<Reconciler> {
        Arc::clone(&self.reconciler)
    }

    /// Runs the worker until an interrupt signal arrives, then shuts
    /// down within the configured grace period.
    ///
    /// Returns [`RuntimeError::InitialCount`] if the very first upstream
    /// count fails — no tracked state can be established, so the caller
    /// should terminate the process. A shutdown that exceeds the grace
    /// deadline still returns `Ok(())`; the unfinished sweep is orphaned
    /// by process exit.
    pub async fn run(&self) -> Result<(), RuntimeError> {
        // Give the network stack a moment before the first upstream call.
        time::sleep(self.cfg.settle).await;

        let count = self
            .source
            .count()
            .await
            .map_err(|source| RuntimeError::InitialCount { source })?;
        self.reconciler.seed(count).await;

        self.subscriber_listener();

        let token = CancellationToken::new();
        let ticker = Ticker::new(
            Arc::clone(&self.reconciler),
            self.cfg.interval,
            self.bus.clone(),
        );
        let handle = tokio::spawn(ticker.run(token.clone()));

        self.bus
            .publish(Event::new(EventKind::WorkerStarted).with_count(count));
        log::info!("worker started, tracking {} entities", count.saturating_sub(1));

        // Run the shutdown sequence even if signal registration failed,
        // so the ticker task never outlives an early error return.
        let signal = shutdown::wait_for_interrupt().await;
        self.shutdown(token, handle).await?;

        log::info!("shutting down");
        signal?;
        Ok(())
    }

    /// Post-signal shutdown sequence: announce, cancel, bounded wait.
    ///
    /// Always succeeds from the caller's perspective — a ticker that
    /// overruns the grace deadline (or panicked earlier) is logged and
    /// orphaned, not surfaced as an application error.
    async fn shutdown(
        &self,
        token: CancellationToken,
        handle: JoinHandle<()>,
    ) -> Result<(), RuntimeError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        token.cancel();
        self.wait_with_grace(handle).await;
        Ok(())
    }

    /// Subscribes to the bus and forwards events to every subscriber,
    /// sequentially and in publish order.
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let subs = self.subscribers.clone();
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                for sub in &subs {
                    sub.on_event(&ev).await;
                }
            }
        });
    }

    /// Waits for the ticker task to finish within the grace period.
    ///
    /// Past the deadline the in-flight sweep is orphaned; this is logged
    /// but not surfaced as an application error. A ticker that panicked
    /// joins immediately with an error and is reported as a task
    /// failure, not as a clean stop.
    async fn wait_with_grace(&self, handle: JoinHandle<()>) {
        match time::timeout(self.cfg.grace, handle).await {
            Ok(Ok(())) => {
                self.bus.publish(Event::new(EventKind::StoppedWithinGrace));
            }
            Ok(Err(join_err)) => {
                log::error!("ticker task failed before shutdown completed: {join_err}");
            }
            Err(_elapsed) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                log::warn!(
                    "ticker did not stop within {:?}, exiting anyway",
                    self.cfg.grace
                );
            }
        }
    }
}
