//! Process shutdown signals.

use std::future::Future;

/// Installs the shutdown signal handlers and returns a future that resolves
/// with the name of the first signal received: `SIGINT` (Ctrl-C) or, on
/// Unix, `SIGTERM`.
///
/// Handlers are registered before this returns, so a signal arriving
/// before the future is first polled is not lost.
///
/// # Errors
///
/// Returns an error if the `SIGTERM` handler cannot be installed.
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = &'static str>> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        #[cfg(unix)]
        {
            tokio::select! {
                Ok(()) = tokio::signal::ctrl_c() => "SIGINT",
                Some(()) = terminate.recv() => "SIGTERM",
                else => {
                    tracing::warn!("signal handlers closed; waiting indefinitely");
                    std::future::pending().await
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler unavailable; waiting indefinitely");
                std::future::pending::<()>().await;
            }
            "SIGINT"
        }
    })
}
