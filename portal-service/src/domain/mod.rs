//! Persisted entities
//!
//! Each entity implements [`Entity`](crate::repository::Entity) and derives its
//! validation rules with `validator`. Optional columns are `Option<T>`: `None` reads from
//! and writes to SQL `NULL` and serializes as JSON `null`.

mod access;
mod content;

use std::collections::HashMap;

pub use access::{Permission, PermissionGroup, Role, User, UserToken};
pub use content::{Banner, Category, Customer, Footer, Partner, Post, Resource};

use crate::repository::Entity;

/// Index association rows by primary key
pub(crate) fn by_id<E: Entity>(rows: Vec<E>) -> HashMap<i64, E> {
    rows.into_iter()
        .filter_map(|row| row.id().map(|id| (id, row)))
        .collect()
}
