//! gRPC server

use std::net::SocketAddr;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tower_http::trace::TraceLayer;

use super::handlers::PortalHandler;
use super::interceptors::request_id_interceptor;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::proto::{
    portal_auth_server::PortalAuthServer, portal_banner_server::PortalBannerServer,
    portal_post_server::PortalPostServer,
};

/// Serves the portal services and the standard health service on one port
#[derive(Debug)]
pub struct GrpcServer {
    addr: SocketAddr,
    request_timeout: Duration,
    handler: PortalHandler,
}

impl GrpcServer {
    pub fn new(config: &ServiceConfig, handler: PortalHandler) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], config.grpc_port)),
            request_timeout: config.request_timeout(),
            handler,
        }
    }

    /// Get the socket address for the gRPC server
    pub fn socket_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until `shutdown` is canceled, then stop accepting and drain
    pub async fn serve(self, shutdown: CancellationToken) -> Result<()> {
        let (reporter, health_service) = tonic_health::server::health_reporter();
        reporter.set_serving::<PortalAuthServer<PortalHandler>>().await;
        reporter.set_serving::<PortalBannerServer<PortalHandler>>().await;
        reporter.set_serving::<PortalPostServer<PortalHandler>>().await;

        tracing::info!("gRPC server listening on {}", self.addr);

        Server::builder()
            .timeout(self.request_timeout)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .layer(TraceLayer::new_for_grpc())
            .add_service(health_service)
            .add_service(PortalAuthServer::with_interceptor(
                self.handler.clone(),
                request_id_interceptor,
            ))
            .add_service(PortalBannerServer::with_interceptor(
                self.handler.clone(),
                request_id_interceptor,
            ))
            .add_service(PortalPostServer::with_interceptor(
                self.handler,
                request_id_interceptor,
            ))
            .serve_with_shutdown(self.addr, shutdown.cancelled_owned())
            .await?;

        tracing::info!("gRPC server stopped");
        Ok(())
    }
}
