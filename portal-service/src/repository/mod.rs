//! Generic data access over PostgreSQL
//!
//! [`Repository<E>`] implements the CRUD operations once for every [`Entity`]:
//! conditional find, take, upsert, delete and paginated find. Filters are expressed as
//! [`Condition`] values, which bind every value and validate every column name.
//!
//! [`RepositoryContainer`] owns the shared pool and hands out one repository per entity
//! plus the [`Transaction`](crate::transaction::Transaction) factory.
//!
//! # Example
//!
//! ```rust,ignore
//! use portal_service::context::Context;
//! use portal_service::domain::Banner;
//! use portal_service::repository::{Condition, Pagination, RepositoryContainer};
//!
//! let repos = RepositoryContainer::new(pool);
//! let (banners, total) = repos
//!     .banner_repository()
//!     .find_by_conditions_with_pagination(
//!         &Context::background(),
//!         Pagination::new(Some(1), Some(10)),
//!         &[Condition::preload_associations(), Condition::eq("status", Banner::STATUS_ACTIVE)],
//!     )
//!     .await?;
//! ```

pub mod condition;
mod container;
mod entity;
mod generic;
pub mod pagination;

pub use condition::{like_pattern, Condition, FilterValue};
pub use container::RepositoryContainer;
pub use entity::{fetch_related, Entity};
pub use generic::{Operation, Repository};
pub use pagination::{Pagination, DEFAULT_LIMIT, DEFAULT_PAGE};
