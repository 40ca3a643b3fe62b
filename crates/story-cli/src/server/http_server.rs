use std::future::IntoFuture;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until SIGINT or SIGTERM.
///
/// In-flight requests get the configured shutdown timeout to finish; any
/// still open afterwards are dropped.
pub async fn serve(app: Router, config: ServerConfig) -> io::Result<()> {
    let addr = config.server_addr();
    let listener = TcpListener::bind(addr)
        .await
        .inspect_err(|err| log_failure(err, Duration::ZERO))?;

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "listening on all interfaces"
        );
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %listener.local_addr().unwrap_or(addr),
        "listening for connections"
    );

    let started = Instant::now();
    let grace = config.shutdown_timeout();

    let signalled = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let signalled = Arc::clone(&signalled);
        async move {
            wait_for_signal(grace).await;
            signalled.notify_one();
        }
    });
    let deadline = async {
        signalled.notified().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server.into_future() => {
            result.inspect_err(|err| log_failure(err, started.elapsed()))?;
        }
        () = deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                "shutdown timeout elapsed, dropping open connections"
            );
        }
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        uptime_secs = started.elapsed().as_secs(),
        "server stopped"
    );

    Ok(())
}

/// Resolves on the first of Ctrl+C or (on Unix) SIGTERM.
async fn wait_for_signal(grace: Duration) {
    let signal = tokio::select! {
        () = interrupt() => "SIGINT",
        () = terminate() => "SIGTERM",
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal,
        grace_secs = grace.as_secs(),
        "draining connections"
    );
}

async fn interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            "cannot listen for SIGINT"
        );
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                "cannot listen for SIGTERM"
            );
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

fn log_failure(err: &io::Error, uptime: Duration) {
    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        error = %err,
        kind = ?err.kind(),
        uptime_secs = uptime.as_secs(),
        "server failed"
    );

    if let Some(hint) = bind_hint(err.kind()) {
        tracing::info!(target: TRACING_TARGET_SERVER_SHUTDOWN, hint, "how to fix");
    }
}

fn bind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::AddrInUse => Some("another process holds the port; pick a different PORT"),
        io::ErrorKind::PermissionDenied => Some("ports below 1024 need elevated privileges"),
        io::ErrorKind::AddrNotAvailable => Some("HOST is not an address of this machine"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    #[test]
    fn hints_for_bind_failures() {
        assert!(bind_hint(io::ErrorKind::AddrInUse).is_some());
        assert!(bind_hint(io::ErrorKind::PermissionDenied).is_some());
        assert!(bind_hint(io::ErrorKind::Other).is_none());
    }

    #[tokio::test]
    async fn occupied_port_is_an_error() -> anyhow::Result<()> {
        let taken = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let config = ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: taken.local_addr()?.port(),
            ..ServerConfig::default()
        };

        let err = serve(Router::new(), config).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
        Ok(())
    }
}
