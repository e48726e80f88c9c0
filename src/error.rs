//! Error types used by the reconciliation worker and its collaborators.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`] — fatal errors raised by the supervisor itself.
//! - [`SourceError`] — transient failures of the upstream entity source.
//! - [`BuildError`] — failures of the external artifact builder.
//!
//! Transient errors are never escalated above a sweep: a failed count
//! skips the whole sweep, a failed fetch or build skips that id. Only
//! [`RuntimeError`] reaches the caller of `Supervisor::run`.
//!
//! All types provide `as_label()` for stable snake_case identifiers in
//! logs/metrics.

use thiserror::Error;

/// # Fatal errors produced by the worker runtime.
///
/// These abort the process before the periodic behavior starts; once the
/// ticker is running, nothing below the supervisor escalates.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The initial upstream count failed; no tracked state can be
    /// established, so the worker cannot start.
    #[error("could not read initial entity count: {source}")]
    InitialCount {
        /// The underlying upstream failure.
        #[source]
        source: SourceError,
    },

    /// Installing the OS interrupt handler failed.
    #[error("signal handler registration failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InitialCount { .. } => "runtime_initial_count",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }
}

/// # Transient failures of the upstream entity source.
///
/// Covers connectivity and call failures for both `count` and per-id
/// `fetch`. Every variant is retryable: a sweep swallows these and the
/// next tick (or the next sweep over the same id) tries again.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// The upstream call failed (connectivity, timeout, bad response).
    #[error("upstream call failed: {error}")]
    Call {
        /// The underlying error message.
        error: String,
    },
}

impl SourceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::Call { .. } => "source_call_failed",
        }
    }
}

/// # Failures of the external artifact builder.
///
/// A build failure leaves the entity's status untouched; it stays
/// `success = false` and is retried on every future sweep with no cap
/// and no backoff. Partial-artifact cleanup is the builder's concern,
/// not the worker's.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum BuildError {
    /// Rendering or persisting the artifact failed.
    #[error("artifact build failed: {error}")]
    Create {
        /// The underlying error message.
        error: String,
    },
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::Create { .. } => "artifact_create_failed",
        }
    }
}
