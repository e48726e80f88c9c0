//! # Event subscriber trait.
//!
//! Provides [`Subscriber`] an extension point for plugging custom event
//! handlers into the worker (logging, metrics, alerting).
//!
//! Subscribers are invoked from the supervisor's listener task,
//! sequentially and in publish order. A slow subscriber delays the ones
//! behind it, and a listener that lags more than the bus capacity skips
//! the oldest events.

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for worker observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the supervisor's listener task, not in the publisher
    /// context. Events are delivered in publish order.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs.
    ///
    /// Prefer short, descriptive names (e.g. "metrics", "audit"). The
    /// default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
