//! # Reconciliation: build-status tracking and the sweep state machine.
//!
//! This module contains the worker's only real state:
//! - [`BuildStatus`], [`BuildStatusStore`] per-id build bookkeeping
//! - [`Reconciler`] executes one sweep over the tracked id range
//!
//! The store has no locking of its own; it lives behind the reconciler's
//! sweep guard and is never visible to any other execution context.

mod reconciler;
mod status;

pub use reconciler::Reconciler;
pub use status::{BuildStatus, BuildStatusStore};
