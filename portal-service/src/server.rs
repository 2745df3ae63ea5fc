//! Process runner: gRPC server and REST gateway with coordinated shutdown

use std::future::Future;
use std::time::Duration;

use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    auth::{JwtGenerator, PasswordHasher},
    config::Config,
    database::create_pool,
    error::{Error, Result},
    gateway::Gateway,
    grpc::{GrpcServer, PortalHandler},
    repository::RepositoryContainer,
};

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run both listeners until a signal arrives or either of them stops
    ///
    /// Each listener gets `shutdown_timeout_secs` to drain once shutdown starts and is
    /// aborted after that. The pool is closed last.
    pub async fn run(self) -> Result<()> {
        let config = self.config;
        tracing::info!("Starting {}", config.service.name);

        let pool = create_pool(&config.database).await?;
        let handler = PortalHandler::new(
            RepositoryContainer::new(pool.clone()),
            JwtGenerator::new(&config.jwt),
            PasswordHasher::default(),
        );
        let grpc = GrpcServer::new(&config.service, handler);
        let gateway = Gateway::new(&config)?;

        let shutdown = CancellationToken::new();
        let grace = config.service.shutdown_timeout();

        let grpc_task = tokio::spawn(supervise(
            "gRPC server",
            grpc.serve(shutdown.clone()),
            shutdown.clone(),
        ));
        let gateway_task = tokio::spawn(supervise(
            "gateway",
            gateway.serve(shutdown.clone()),
            shutdown.clone(),
        ));

        tokio::select! {
            _ = shutdown_signal() => {},
            _ = shutdown.cancelled() => {
                tracing::warn!("A listener stopped, shutting down");
            },
        }
        shutdown.cancel();

        let (grpc_result, gateway_result) = tokio::join!(
            drain("gRPC server", grpc_task, grace),
            drain("gateway", gateway_task, grace),
        );

        pool.close().await;
        tracing::info!("Server shutdown complete");

        grpc_result.and(gateway_result)
    }
}

/// Await a listener and trigger shutdown for everyone once it stops
async fn supervise<F>(name: &'static str, listener: F, shutdown: CancellationToken) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    let result = listener.await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "{} failed", name);
    }
    shutdown.cancel();
    result
}

/// Wait up to `grace` for a listener task, aborting it afterwards
async fn drain(name: &'static str, mut task: JoinHandle<Result<()>>, grace: Duration) -> Result<()> {
    match tokio::time::timeout(grace, &mut task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(Error::Internal(format!("{} task failed: {}", name, e))),
        Err(_) => {
            tracing::warn!("{} did not drain within {:?}, aborting", name, grace);
            task.abort();
            Ok(())
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let config = Config::default();
        let server = Server::new(config.clone());
        assert_eq!(server.config().service.grpc_port, config.service.grpc_port);
    }

    #[tokio::test]
    async fn test_failed_listener_cancels_shutdown() {
        let shutdown = CancellationToken::new();
        let result = supervise(
            "test",
            async { Err(Error::Internal("address in use".to_string())) },
            shutdown.clone(),
        )
        .await;

        assert!(result.is_err());
        assert!(shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn test_drain_returns_listener_result() {
        let task = tokio::spawn(async { Ok(()) });
        assert!(drain("test", task, Duration::from_secs(1)).await.is_ok());

        let task = tokio::spawn(async { Err(Error::Internal("boom".to_string())) });
        assert!(drain("test", task, Duration::from_secs(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_drain_aborts_stuck_listener() {
        let task = tokio::spawn(std::future::pending::<Result<()>>());
        let started = tokio::time::Instant::now();

        assert!(drain("test", task, Duration::from_millis(20)).await.is_ok());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_panicked_listener_is_an_error() {
        let task: JoinHandle<Result<()>> = tokio::spawn(async { panic!("listener crashed") });
        assert!(drain("test", task, Duration::from_secs(1)).await.is_err());
    }
}
