//! # mintsweep
//!
//! **mintsweep** is a background reconciliation worker. It periodically
//! sweeps a bounded, growing range of sequential entity ids, tracks a
//! per-id build status, and drives an external artifact builder until
//! every entity has an up-to-date derived artifact. Already-built
//! entities get a bounded number of forced rebuilds ("backfills") to
//! absorb upstream data that settles after the first successful build.
//!
//! ## Architecture
//! ```text
//!   Supervisor::run()
//!     ├─► settle delay, initial EntitySource::count()  (failure = fatal)
//!     ├─► Reconciler::seed()         pre-register [1, count) with budget 0
//!     ├─► spawn Ticker               interval-driven, cooperative stop
//!     │        │
//!     │        └─► every tick: Reconciler::sweep()
//!     │                ├─ lock sweep guard (whole sweep)
//!     │                ├─ re-read count (failure = skip sweep)
//!     │                └─ for id in [1, count):
//!     │                     ├─ register new ids (budget 10)
//!     │                     ├─ forced-rebuild rule (budget, 60s threshold)
//!     │                     └─ fetch → decode → ArtifactBuilder::create
//!     │                          (per-id failures counted, never escalated)
//!     ├─► block on interrupt signal
//!     └─► cancel token ─► wait for ticker up to grace (15s) ─► exit
//!
//! Observability:
//!   Supervisor / Ticker / Reconciler ── publish(Event) ──► Bus
//!                                                            │
//!                                                     subscriber_listener
//!                                                            │
//!                                                  Subscriber::on_event()
//!                                                  (e.g. LogWriter)
//! ```
//!
//! ## Build-status state machine
//! ```text
//!             ┌──────────────────────────────────────────┐
//!             ▼                                          │
//!   pending (success=false) ── build ok ──► built (success=true)
//!             │                                          │
//!        build fails                 updates_left > 0 && stale for ≥ 60s
//!   (retried every sweep, no cap)                        │
//!             │                        updates_left -= 1, force rebuild
//!             └◄─────────────────────────────────────────┘
//!
//!   built with updates_left == 0 is permanently stable.
//! ```
//!
//! ## Rules
//! - At most one sweep executes at any instant (single guard, held for
//!   the full sweep body).
//! - Ids are processed in ascending order, sequentially; no per-entity
//!   parallelism.
//! - Transient upstream failures are swallowed: a failed count skips the
//!   whole sweep, a failed fetch/build skips that id. Nothing below the
//!   supervisor ever escalates an error.
//! - Shutdown is cooperative: the stop token is observed between ticks
//!   only; an in-flight sweep runs to completion or is orphaned once the
//!   grace deadline passes.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use mintsweep::{Config, LogWriter, Subscriber, Supervisor};
//! # use mintsweep::{ArtifactBuilder, EntitySource};
//! # async fn demo(source: Arc<dyn EntitySource>, builder: Arc<dyn ArtifactBuilder>) {
//! let subs: Vec<Arc<dyn Subscriber>> = vec![Arc::new(LogWriter)];
//! let sup = Supervisor::new(Config::default(), source, builder, subs);
//! if let Err(e) = sup.run().await {
//!     eprintln!("worker failed to start: {e}");
//!     std::process::exit(1);
//! }
//! # }
//! ```

mod artifact;
mod config;
mod core;
mod domain;
mod error;
mod events;
mod reconcile;
mod subscribers;
mod upstream;

// ---- Public re-exports ----

pub use artifact::ArtifactBuilder;
pub use config::Config;
pub use core::Supervisor;
pub use domain::{decode, Attributes, Entity, RawRecord};
pub use error::{BuildError, RuntimeError, SourceError};
pub use events::{Bus, Event, EventKind};
pub use reconcile::{BuildStatus, BuildStatusStore, Reconciler};
pub use subscribers::{LogWriter, Subscriber};
pub use upstream::EntitySource;
