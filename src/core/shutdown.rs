//! # Cross-platform interrupt handling.
//!
//! Provides [`wait_for_interrupt`] an async helper that completes when
//! the process receives the interrupt signal.
//!
//! Only the interrupt (Ctrl-C / `SIGINT`) triggers graceful shutdown;
//! `SIGKILL` and friends are deliberately not caught.

/// Waits for the interrupt signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when the signal is received, or `Err` if signal
/// registration fails.
#[cfg(unix)]
pub async fn wait_for_interrupt() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv() => {},
    }
    Ok(())
}

/// Waits for the interrupt signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when the signal is received, or `Err` if signal
/// registration fails.
#[cfg(not(unix))]
pub async fn wait_for_interrupt() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
