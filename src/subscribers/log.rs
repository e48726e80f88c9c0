//! # Logging subscriber.
//!
//! [`LogWriter`] renders worker events through the [`log`] facade in a
//! compact, human-readable format.
//!
//! ## Output format
//! ```text
//! [started] tracking=41 entities
//! [sweep] starting
//! [sweep] done count=42 built=3 errors=1
//! [sweep] skipped reason="upstream call failed: rpc timeout"
//! [backfill] entity=17 updates_left=9
//! [built] entity=17
//! [build-failed] entity=23 reason="artifact build failed: bucket gone"
//! [shutdown-requested]
//! [stopped-within-grace]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscriber;

/// Renders events via `log::info!`/`log::warn!`.
///
/// Wire up any `log`-compatible backend (env_logger, systemd journal,
/// ...) in the process entry point; this subscriber only formats.
pub struct LogWriter;

#[async_trait]
impl Subscriber for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::WorkerStarted => {
                let tracked = e.count.unwrap_or(0).saturating_sub(1);
                log::info!("[started] tracking={tracked} entities");
            }
            EventKind::SweepStarted => {
                log::info!("[sweep] starting");
            }
            EventKind::SweepSkipped => {
                log::warn!("[sweep] skipped reason={:?}", e.reason);
            }
            EventKind::SweepCompleted => {
                log::info!(
                    "[sweep] done count={:?} built={:?} errors={:?}",
                    e.count,
                    e.built,
                    e.errors
                );
            }
            EventKind::ErrorsAboveThreshold => {
                log::warn!(
                    "[sweep] too many errors ({:?}), something is wrong",
                    e.errors
                );
            }
            EventKind::BackfillScheduled => {
                log::info!(
                    "[backfill] entity={:?} updates_left={:?}",
                    e.entity,
                    e.updates_left
                );
            }
            EventKind::EntityBuilt => {
                log::info!("[built] entity={:?}", e.entity);
            }
            EventKind::EntityBuildFailed => {
                log::warn!("[build-failed] entity={:?} reason={:?}", e.entity, e.reason);
            }
            EventKind::ShutdownRequested => {
                log::info!("[shutdown-requested]");
            }
            EventKind::TickerStopped => {
                log::info!("[ticker-stopped]");
            }
            EventKind::StoppedWithinGrace => {
                log::info!("[stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                log::warn!("[grace-exceeded] orphaning in-flight sweep");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
