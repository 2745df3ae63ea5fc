//! Health check handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tonic_health::pb::{
    health_check_response::ServingStatus, health_client::HealthClient, HealthCheckRequest,
};

use super::GatewayState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Readiness check response with dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub service: String,
    pub dependencies: HashMap<String, DependencyStatus>,
}

/// Individual dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub healthy: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Liveness probe; 200 whenever the gateway is running
pub async fn health(State(state): State<GatewayState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: state.service_name.to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness probe; 503 unless the gRPC backend reports serving
pub async fn readiness(State(state): State<GatewayState>) -> impl IntoResponse {
    let backend = check_backend(&state).await;
    let ready = backend.healthy;

    let response = ReadinessResponse {
        ready,
        service: state.service_name.to_string(),
        dependencies: HashMap::from([("grpc".to_string(), backend)]),
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

async fn check_backend(state: &GatewayState) -> DependencyStatus {
    let mut client = HealthClient::new(state.channel.clone());
    match client.check(HealthCheckRequest::default()).await {
        Ok(response) if response.get_ref().status == ServingStatus::Serving as i32 => {
            DependencyStatus {
                healthy: true,
                message: None,
            }
        }
        Ok(response) => DependencyStatus {
            healthy: false,
            message: Some(format!("serving status {}", response.get_ref().status)),
        },
        Err(status) => {
            tracing::warn!(code = ?status.code(), "gRPC backend health check failed");
            DependencyStatus {
                healthy: false,
                message: Some(status.message().to_string()),
            }
        }
    }
}
