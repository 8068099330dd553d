//! Process lifecycle: bind, serve, and shut down gracefully.

use std::future::{Future, IntoFuture};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServeConfig;
use crate::error::ServiceError;
use crate::routes::{router, AppState};

/// A bound, not yet running, HTTP server.
///
/// Binding is separate from serving so callers (and tests binding port 0) can
/// learn the actual address before the first request.
pub struct Server {
    listener: TcpListener,
    app: Router,
    local_addr: SocketAddr,
    shutdown_timeout: Duration,
}

impl Server {
    /// Validate `config`, build the router and bind the listener.
    pub async fn bind(config: &ServeConfig) -> Result<Self, ServiceError> {
        config.validate()?;

        let listener = TcpListener::bind(config.bind)
            .await
            .map_err(|source| ServiceError::Bind {
                addr: config.bind,
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServiceError::Bind {
                addr: config.bind,
                source,
            })?;
        let state = AppState::new(config.codec()).with_port(local_addr.port());
        let app = router(state, config.body_limit());
        info!(
            addr = %local_addr,
            max_body_bytes = config.max_body_bytes,
            delimiter = %config.delimiter,
            strict = !config.lax,
            "toon microservice listening"
        );

        Ok(Self {
            listener,
            app,
            local_addr,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until `signal` resolves, then stop accepting connections and wait
    /// up to the configured timeout for in-flight requests.
    pub async fn run_until<F>(self, signal: F) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send,
    {
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let server = axum::serve(self.listener, self.app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => {
                result.map_err(ServiceError::Serve)?;
            }
            _ = signal => {
                info!(timeout = ?self.shutdown_timeout, "shutdown requested, draining connections");
                let _ = shutdown_tx.send(());
                match tokio::time::timeout(self.shutdown_timeout, &mut server).await {
                    Ok(result) => result.map_err(ServiceError::Serve)?,
                    Err(_) => {
                        return Err(ServiceError::Serve(io::Error::new(
                            io::ErrorKind::TimedOut,
                            "server shutdown timed out",
                        )));
                    }
                }
            }
        };
        info!("toon microservice stopped");
        Ok(())
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<(), ServiceError> {
        self.run_until(shutdown_signal()).await
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}
