//! REST gateway in front of the gRPC services
//!
//! Routes under `/api/v1/portal` translate JSON requests into calls on a lazily
//! connected tonic [`Channel`] and wrap the replies with [`Responder`]. The
//! `x-request-id` header, generated here when absent, is forwarded as gRPC metadata.

pub mod health;
pub mod responder;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tonic::transport::{Channel, Endpoint};
use tower_http::{
    catch_panic::CatchPanicLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

pub use responder::Responder;

use crate::config::Config;
use crate::error::Result;
use crate::grpc::REQUEST_ID_HEADER;
use crate::middleware::{request_id_layer, request_id_propagation_layer, sensitive_headers_layer};
use crate::proto::{
    GetBannerRequest, GetListBannerRequest, GetListPostRequest, GetPostRequest, LoginRequest,
    PortalAuthClient, PortalBannerClient, PortalPostClient,
};

/// Path prefix of the portal API
pub const API_PREFIX: &str = "/api/v1/portal";

/// Shared by every gateway handler
#[derive(Clone)]
pub struct GatewayState {
    channel: Channel,
    responder: Responder,
    service_name: Arc<str>,
}

impl GatewayState {
    pub fn new(channel: Channel, responder: Responder, service_name: impl Into<Arc<str>>) -> Self {
        Self {
            channel,
            responder,
            service_name: service_name.into(),
        }
    }
}

/// HTTP listener translating REST calls into gRPC
pub struct Gateway {
    addr: SocketAddr,
    router: Router,
}

impl Gateway {
    /// Build the gateway; the gRPC channel connects on first use
    pub fn new(config: &Config) -> Result<Self> {
        let channel = Endpoint::from_shared(config.service.grpc_server.clone())?
            .connect_timeout(Duration::from_secs(5))
            .connect_lazy();

        let state = GatewayState::new(
            channel,
            Responder::new(config.service.environment),
            config.service.name.as_str(),
        );

        Ok(Self {
            addr: SocketAddr::from(([0, 0, 0, 0], config.service.gateway_port)),
            router: router(state, config.service.request_timeout()),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until `shutdown` is canceled, then drain in-flight requests
    pub async fn serve(self, shutdown: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;

        tracing::info!("Gateway listening on {}", self.addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Routes plus the request tracking stack
pub fn router(state: GatewayState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/banners", get(list_banners))
        .route("/banners/{banner_id}", get(get_banner))
        .route("/posts", get(list_posts))
        .route("/posts/{post_id}", get(get_post));

    Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(sensitive_headers_layer())
        .layer(request_id_propagation_layer())
        .layer(request_id_layer())
        .layer(CatchPanicLayer::new())
}

/// gRPC request carrying the caller's request id
fn forward<T>(headers: &HeaderMap, message: T) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    if let Some(id) = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
    {
        request.metadata_mut().insert(REQUEST_ID_HEADER, id);
    }
    request
}

async fn login(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return state.responder.rejected(rejection),
    };

    let result = PortalAuthClient::new(state.channel.clone())
        .login(forward(&headers, body))
        .await;
    state.responder.reply(result)
}

async fn list_banners(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    query: std::result::Result<Query<GetListBannerRequest>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return state.responder.rejected(rejection),
    };

    let result = PortalBannerClient::new(state.channel.clone())
        .get_list_banner(forward(&headers, query))
        .await;
    state.responder.reply(result)
}

async fn get_banner(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    banner_id: std::result::Result<Path<i64>, PathRejection>,
) -> Response {
    let Path(banner_id) = match banner_id {
        Ok(id) => id,
        Err(rejection) => return state.responder.rejected(rejection),
    };

    let result = PortalBannerClient::new(state.channel.clone())
        .get_banner(forward(&headers, GetBannerRequest { banner_id }))
        .await;
    state.responder.reply(result)
}

async fn list_posts(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    query: std::result::Result<Query<GetListPostRequest>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return state.responder.rejected(rejection),
    };

    let result = PortalPostClient::new(state.channel.clone())
        .get_list_post(forward(&headers, query))
        .await;
    state.responder.reply(result)
}

async fn get_post(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    post_id: std::result::Result<Path<i64>, PathRejection>,
) -> Response {
    let Path(post_id) = match post_id {
        Ok(id) => id,
        Err(rejection) => return state.responder.rejected(rejection),
    };

    let result = PortalPostClient::new(state.channel.clone())
        .get_post(forward(&headers, GetPostRequest { post_id }))
        .await;
    state.responder.reply(result)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Environment;

    fn test_router() -> Router {
        let channel = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        let state = GatewayState::new(channel, Responder::new(Environment::Dev), "portal-test");
        router(state, Duration::from_secs(5))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_forward_copies_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "req-42".parse().unwrap());

        let request = forward(&headers, ());
        assert_eq!(
            request.metadata().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap(),
            "req-42"
        );
        assert!(forward(&HeaderMap::new(), ()).metadata().get(REQUEST_ID_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_health_reports_service() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "portal-test");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = test_router()
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "caller-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "caller-id");
    }

    #[tokio::test]
    async fn test_bad_query_is_invalid_argument() {
        let response = test_router()
            .oneshot(
                Request::get("/api/v1/portal/banners?page=first")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], 3);
    }

    #[tokio::test]
    async fn test_bad_path_is_invalid_argument() {
        let response = test_router()
            .oneshot(
                Request::get("/api/v1/portal/posts/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unreachable_backend_yields_error_envelope() {
        let response = test_router()
            .oneshot(
                Request::post("/api/v1/portal/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"admin","password":"secret"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_ne!(body["code"], 0);
        assert!(body["error"]["details"].is_string());
    }

    #[tokio::test]
    async fn test_readiness_fails_without_backend() {
        let response = test_router()
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["ready"], false);
    }
}
