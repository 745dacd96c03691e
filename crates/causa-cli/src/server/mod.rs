//! HTTP listener for the `serve` command.

mod shutdown;

use std::future::IntoFuture;
use std::io;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;
use crate::server::shutdown::{drain_with_deadline, termination_signal};

/// Serves `app` on the configured address until Ctrl+C or SIGTERM.
///
/// After the signal, in-flight requests get at most the configured shutdown
/// timeout to finish.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the listener fails.
pub async fn serve(app: Router, config: ServerConfig) -> io::Result<()> {
    let addr = config.server_addr();
    let listener = TcpListener::bind(addr)
        .await
        .inspect_err(|err| log_bind_failure(addr, err))?;

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %addr,
            "Listening on every interface"
        );
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %addr,
        "Listening"
    );

    let stop = CancellationToken::new();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(stop.clone().cancelled_owned())
        .into_future();

    drain_with_deadline(server, termination_signal(), stop, config.shutdown_timeout()).await
}

fn log_bind_failure(addr: SocketAddr, err: &io::Error) {
    let hint = match err.kind() {
        io::ErrorKind::PermissionDenied => "pick a port above 1024",
        io::ErrorKind::AddrInUse => "another process holds this port",
        io::ErrorKind::AddrNotAvailable => "the host address is not on this machine",
        _ => "",
    };

    tracing::error!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %addr,
        error = %err,
        hint,
        "Cannot bind listener"
    );
}
