//! Service implementations for `portal.v1`
//!
//! One [`PortalHandler`] backs all three services. Every RPC goes through [`serve`],
//! which builds the request [`Context`], opens a span carrying the request id, turns
//! a panic into `Internal` and projects [`DomainError`]s into gRPC statuses.

mod auth;
mod banner;
mod post;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status};
use tracing::Instrument;

use crate::auth::{JwtGenerator, PasswordHasher};
use crate::context::Context;
use crate::domain::Resource;
use crate::error::{DomainError, DomainResult, ErrorCode};
use crate::grpc::interceptors::{grpc_timeout, request_id};
use crate::proto;
use crate::repository::RepositoryContainer;

/// Handler state shared by the auth, banner and post services
#[derive(Clone)]
pub struct PortalHandler {
    repositories: RepositoryContainer,
    jwt: JwtGenerator,
    hasher: PasswordHasher,
}

impl PortalHandler {
    pub fn new(repositories: RepositoryContainer, jwt: JwtGenerator, hasher: PasswordHasher) -> Self {
        Self {
            repositories,
            jwt,
            hasher,
        }
    }
}

impl std::fmt::Debug for PortalHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalHandler")
            .field("repositories", &self.repositories)
            .field("jwt", &self.jwt)
            .finish_non_exhaustive()
    }
}

/// Request context from incoming metadata
pub(crate) fn context_of(metadata: &MetadataMap) -> Context {
    let mut ctx = Context::background();
    if let Some(id) = request_id(metadata) {
        ctx = ctx.with_request_id(id);
    }
    if let Some(timeout) = grpc_timeout(metadata) {
        ctx = ctx.with_timeout(timeout);
    }
    ctx
}

/// Run one RPC body with request context, span and panic recovery
pub(crate) async fn serve<T, R, F, Fut>(
    method: &'static str,
    request: Request<T>,
    handler: F,
) -> Result<Response<R>, Status>
where
    F: FnOnce(Context, T) -> Fut,
    Fut: Future<Output = DomainResult<R>>,
{
    let ctx = context_of(request.metadata());
    let span = tracing::info_span!(
        "rpc",
        method,
        request_id = ctx.request_id().unwrap_or_default()
    );

    // Dropping the call (client gone) cancels the context
    let _cancel_on_drop = ctx.cancellation().clone().drop_guard();

    let outcome = AssertUnwindSafe(handler(ctx, request.into_inner()))
        .catch_unwind()
        .instrument(span.clone())
        .await;

    let _entered = span.enter();
    match outcome {
        Ok(Ok(response)) => Ok(Response::new(response)),
        Ok(Err(err)) => {
            if err.code() == ErrorCode::Internal {
                tracing::error!(code = %err.code(), error = %err, "Request failed");
            } else {
                tracing::info!(code = %err.code(), error = %err, "Request rejected");
            }
            Err(err.into())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(panic = %message, "Handler panicked");
            Err(DomainError::internal(format!("panic: {}", message)).into())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

pub(crate) fn resource_message(resource: &Resource) -> proto::Resource {
    proto::Resource {
        id: resource.id.unwrap_or_default(),
        r#type: resource.resource_type,
        url: resource.url.clone(),
        youtube_id: resource.youtube_id.clone(),
    }
}
