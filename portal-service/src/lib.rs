//! # portal-service
//!
//! Content portal backend: gRPC services for login, banners and posts, a REST gateway
//! translating JSON over HTTP into those calls, and a generic PostgreSQL repository
//! layer underneath.
//!
//! ## Layers
//!
//! - **Repository**: [`Repository<E>`](repository::Repository) gives every
//!   [`Entity`](repository::Entity) the same CRUD surface driven by
//!   [`Condition`](repository::Condition) values (EQ, NEQ, LIKE, IN, IS NULL, OR,
//!   preload), with pagination and validation on both reads and writes.
//! - **Unit of work**: [`Transaction::run`](transaction::Transaction::run) binds one
//!   database transaction to a [`Context`](context::Context); every repository call
//!   made with that context joins it.
//! - **Errors**: [`DomainError`](error::DomainError) carries a gRPC-aligned code and
//!   becomes a `tonic::Status` at the RPC boundary.
//! - **Surfaces**: [`grpc`] serves `portal.v1`; [`gateway`] exposes it under
//!   `/api/v1/portal`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use portal_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     Server::new(config).run().await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod grpc;
pub mod middleware;
pub mod observability;
pub mod proto;
pub mod repository;
pub mod server;
pub mod transaction;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, Environment};
    pub use crate::context::Context;
    pub use crate::error::{DomainError, DomainResult, Error, ErrorCode, Result};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        Condition, Entity, Pagination, Repository, RepositoryContainer,
    };
    pub use crate::server::Server;
    pub use crate::transaction::Transaction;
}
