//! # Event subscribers for worker observability.
//!
//! This module provides the [`Subscriber`] trait and the built-in
//! [`LogWriter`] implementation for handling events broadcast through
//! the [`Bus`](crate::events::Bus).
//!
//! ```text
//! Event flow:
//!   Supervisor / Ticker / Reconciler ── publish(Event) ──► Bus
//!                                                            │
//!                                                     subscriber_listener
//!                                                            │
//!                                               Subscriber::on_event(&Event)
//!                                                   ┌────────┴────────┐
//!                                                   ▼                 ▼
//!                                               LogWriter        custom subs
//! ```
//!
//! ## Implementing custom subscribers
//! ```rust
//! use async_trait::async_trait;
//! use mintsweep::{Event, EventKind, Subscriber};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscriber for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if matches!(event.kind, EventKind::EntityBuildFailed) {
//!             // increment a metric, page someone, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

mod log;
mod subscriber;

pub use log::LogWriter;
pub use subscriber::Subscriber;
