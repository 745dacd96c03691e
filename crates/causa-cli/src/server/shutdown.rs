//! Shutdown signals and the bounded drain that follows them.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Resolves on the first of Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed never fires, so a missing signal
/// source cannot stop the server on its own.
pub async fn termination_signal() {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %err,
                    "Cannot listen for Ctrl+C"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %err,
                    "Cannot listen for SIGTERM"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal = received,
        "Shutdown requested"
    );
}

/// Drives `server` until `signal` fires, then gives it `grace` to finish.
///
/// `stop` is cancelled when the signal fires; the server is expected to stop
/// accepting connections on it. Requests still running once `grace` has
/// passed are abandoned and the call returns `Ok(())`.
pub async fn drain_with_deadline<S, F>(
    server: S,
    signal: F,
    stop: CancellationToken,
    grace: Duration,
) -> io::Result<()>
where
    S: Future<Output = io::Result<()>>,
    F: Future<Output = ()>,
{
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        () = signal => {}
    }

    stop.cancel();
    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        grace_secs = grace.as_secs(),
        "Draining in-flight requests"
    );

    match tokio::time::timeout(grace, server).await {
        Ok(result) => {
            tracing::info!(target: TRACING_TARGET_SERVER_SHUTDOWN, "Drained");
            result
        }
        Err(_) => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                grace_secs = grace.as_secs(),
                "Requests still running after the shutdown timeout, exiting anyway"
            );
            Ok(())
        }
    }
}
