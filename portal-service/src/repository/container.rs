//! Per-entity repositories sharing one pool

use sqlx::PgPool;

use super::Repository;
use crate::domain::{
    Banner, Category, Customer, Footer, Partner, Permission, PermissionGroup, Post, Resource,
    Role, User, UserToken,
};
use crate::transaction::Transaction;

/// Shared by every handler; cloning is cheap
#[derive(Clone, Debug)]
pub struct RepositoryContainer {
    pool: PgPool,
}

impl RepositoryContainer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Unit-of-work factory over the same pool
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.pool.clone())
    }

    pub fn banner_repository(&self) -> Repository<Banner> {
        Repository::new(self.pool.clone())
    }

    pub fn category_repository(&self) -> Repository<Category> {
        Repository::new(self.pool.clone())
    }

    pub fn customer_repository(&self) -> Repository<Customer> {
        Repository::new(self.pool.clone())
    }

    pub fn footer_repository(&self) -> Repository<Footer> {
        Repository::new(self.pool.clone())
    }

    pub fn partner_repository(&self) -> Repository<Partner> {
        Repository::new(self.pool.clone())
    }

    pub fn permission_group_repository(&self) -> Repository<PermissionGroup> {
        Repository::new(self.pool.clone())
    }

    pub fn permission_repository(&self) -> Repository<Permission> {
        Repository::new(self.pool.clone())
    }

    pub fn post_repository(&self) -> Repository<Post> {
        Repository::new(self.pool.clone())
    }

    pub fn resource_repository(&self) -> Repository<Resource> {
        Repository::new(self.pool.clone())
    }

    pub fn role_repository(&self) -> Repository<Role> {
        Repository::new(self.pool.clone())
    }

    pub fn user_repository(&self) -> Repository<User> {
        Repository::new(self.pool.clone())
    }

    pub fn user_token_repository(&self) -> Repository<UserToken> {
        Repository::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::repository::Condition;

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_transaction_commit_is_visible_through_other_repositories() {
        let repos = RepositoryContainer::new(crate::repository::test_support::pool().await);
        let ctx = Context::background();
        let name = format!("commit-{}", uuid::Uuid::new_v4());

        let footers = repos.footer_repository();
        repos
            .transaction()
            .run(&ctx, |tx_ctx| {
                let footers = footers.clone();
                let name = name.clone();
                async move { footers.save(&tx_ctx, &mut Footer::named(&name)).await }
            })
            .await
            .expect("commit");

        let found = repos
            .footer_repository()
            .find_by_conditions(&ctx, &[Condition::eq("name_vi", name.as_str())])
            .await
            .expect("find");
        assert_eq!(found.len(), 1);
    }
}
