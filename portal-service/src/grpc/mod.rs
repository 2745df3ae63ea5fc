//! gRPC surface of the portal
//!
//! Three services from package `portal.v1` are served together with the standard
//! `grpc.health.v1.Health` service:
//!
//! - `PortalAuth`: username/password login issuing an access token
//! - `PortalBanner`: paginated banner listing and lookup
//! - `PortalPost`: paginated post listing and lookup
//!
//! Every service is wrapped in [`request_id_interceptor`], so handlers always see an
//! `x-request-id` in metadata.

pub mod handlers;
pub mod interceptors;
pub mod server;

pub use handlers::PortalHandler;
pub use interceptors::{request_id_interceptor, REQUEST_ID_HEADER};
pub use server::GrpcServer;
