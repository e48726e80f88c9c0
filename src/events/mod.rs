//! Worker events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the supervisor, the ticker and
//! the reconciler.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor`, `Ticker`, `Reconciler::sweep`.
//! - **Consumer**: `Supervisor::subscriber_listener()`, which fans events
//!   out to every registered [`Subscriber`](crate::Subscriber).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
