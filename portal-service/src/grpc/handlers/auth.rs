//! `PortalAuth` service

use std::collections::HashSet;

use tonic::{Request, Response, Status};

use super::{serve, PortalHandler};
use crate::auth::IssuedToken;
use crate::context::Context;
use crate::domain::{Permission, User, UserToken};
use crate::error::{DomainError, DomainResult, ErrorCode};
use crate::proto::{self, portal_auth_server::PortalAuth, LoginRequest, LoginResponse};
use crate::repository::Condition;

const ACCOUNT_NOT_FOUND: &str = "Không tìm thấy tài khoản";
const WRONG_PASSWORD: &str = "Sai mật khẩu";
const ACCOUNT_LOCKED: &str = "Không thể đăng nhập do tài khoản của bạn đang bị khóa";

#[tonic::async_trait]
impl PortalAuth for PortalHandler {
    async fn login(&self, request: Request<LoginRequest>) -> Result<Response<LoginResponse>, Status> {
        serve("PortalAuth/Login", request, |ctx, req| self.login_user(ctx, req)).await
    }
}

impl PortalHandler {
    async fn login_user(&self, ctx: Context, req: LoginRequest) -> DomainResult<LoginResponse> {
        let user = self
            .repositories
            .user_repository()
            .take_by_conditions(
                &ctx,
                &[
                    Condition::eq("username", req.username.as_str()),
                    Condition::preload_associations(),
                ],
            )
            .await
            .map_err(|e| match e.code() {
                ErrorCode::NotFound => e.with_message(ACCOUNT_NOT_FOUND),
                _ => e,
            })?;

        if !self.hasher.verify(&req.password, &user.password)? {
            return Err(DomainError::code_msg(ErrorCode::FailedPrecondition, WRONG_PASSWORD));
        }
        if user.status != User::STATUS_ACTIVE {
            return Err(DomainError::code_msg(ErrorCode::FailedPrecondition, ACCOUNT_LOCKED));
        }

        let user_id = user
            .id
            .ok_or_else(|| DomainError::internal("user row without id"))?;
        let permissions = unique_permissions(self.permissions_of(&ctx, &user).await?);
        let issued = self.jwt.issue(user_id, &user.username, &user.email)?;

        self.persist_token(&ctx, user_id, &issued);

        tracing::info!(user_id, token_id = %issued.token_id, "User logged in");

        Ok(LoginResponse {
            access_token: issued.token,
            permissions: permissions
                .into_iter()
                .map(|p| proto::Permission {
                    function_code: p.function_code,
                })
                .collect(),
            token_id: issued.token_id,
            user: Some(proto::User {
                id: user_id,
                username: user.username,
                email: user.email,
                is_admin: user.is_admin,
            }),
        })
    }

    /// Every permission for full-permission groups, otherwise those granted by roles
    async fn permissions_of(&self, ctx: &Context, user: &User) -> DomainResult<Vec<Permission>> {
        let full = user
            .permission_group
            .as_ref()
            .is_some_and(|group| group.full_permission);

        if full {
            return self
                .repositories
                .permission_repository()
                .find_by_conditions(ctx, &[])
                .await;
        }

        let roles = self
            .repositories
            .role_repository()
            .find_by_conditions(
                ctx,
                &[
                    Condition::eq("permission_group_id", user.permission_group_id),
                    Condition::preload_associations(),
                ],
            )
            .await?;

        Ok(roles.into_iter().filter_map(|role| role.permission).collect())
    }

    /// Record the token in the background; the login response does not wait for it
    fn persist_token(&self, ctx: &Context, user_id: i64, issued: &IssuedToken) {
        let repository = self.repositories.user_token_repository();
        let ctx = ctx.detached();
        let mut token = UserToken {
            user_id,
            token: issued.token.clone(),
            token_id: issued.token_id.clone(),
            expired_at: issued.expires_at,
            ..UserToken::default()
        };

        tokio::spawn(async move {
            if let Err(e) = repository.save(&ctx, &mut token).await {
                tracing::warn!(
                    request_id = ctx.request_id().unwrap_or_default(),
                    token_id = %token.token_id,
                    error = %e,
                    "Failed to persist user token"
                );
            }
        });
    }
}

/// Drop repeated permissions by id, keeping first occurrences in order
fn unique_permissions(permissions: Vec<Permission>) -> Vec<Permission> {
    let mut seen = HashSet::new();
    permissions
        .into_iter()
        .filter(|p| seen.insert(p.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtGenerator, PasswordHasher};
    use crate::config::JwtConfig;
    use crate::domain::PermissionGroup;
    use crate::repository::{test_support, RepositoryContainer};

    fn permission(id: i64, code: &str) -> Permission {
        Permission {
            id: Some(id),
            permission_name: code.to_string(),
            function_code: code.to_string(),
            ..Permission::default()
        }
    }

    #[test]
    fn test_unique_permissions_keeps_first_occurrence() {
        let permissions = vec![
            permission(2, "banner.read"),
            permission(1, "post.read"),
            permission(2, "banner.read"),
            permission(3, "post.write"),
            permission(1, "post.read"),
        ];

        let codes: Vec<_> = unique_permissions(permissions)
            .into_iter()
            .map(|p| p.function_code)
            .collect();
        assert_eq!(codes, ["banner.read", "post.read", "post.write"]);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_wrong_password_is_failed_precondition() {
        let pool = test_support::pool().await;
        let repositories = RepositoryContainer::new(pool);
        let hasher = PasswordHasher::new(8, 1, 1).unwrap();
        let ctx = Context::background();

        let mut group = PermissionGroup {
            name: "editors".to_string(),
            ..PermissionGroup::default()
        };
        repositories
            .permission_group_repository()
            .save(&ctx, &mut group)
            .await
            .unwrap();

        let username = format!("login-{}", uuid::Uuid::new_v4());
        let mut user = User {
            full_name: "Login Test".to_string(),
            email: "login@example.com".to_string(),
            username: username.clone(),
            password: hasher.hash("correct horse").unwrap(),
            status: User::STATUS_ACTIVE,
            permission_group_id: group.id.unwrap(),
            ..User::default()
        };
        repositories.user_repository().save(&ctx, &mut user).await.unwrap();

        let handler = PortalHandler::new(
            repositories.clone(),
            JwtGenerator::new(&JwtConfig {
                secret: "test-secret".to_string(),
                ..JwtConfig::default()
            }),
            hasher,
        );

        let err = handler
            .login_user(
                ctx.clone(),
                LoginRequest {
                    username: username.clone(),
                    password: "battery staple".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FailedPrecondition);
        assert_eq!(err.message(), WRONG_PASSWORD);

        let response = handler
            .login_user(
                ctx.clone(),
                LoginRequest {
                    username,
                    password: "correct horse".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(!response.access_token.is_empty());
        assert_eq!(response.user.unwrap().id, user.id.unwrap());
        assert!(response.permissions.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_unknown_user_is_not_found() {
        let repositories = RepositoryContainer::new(test_support::pool().await);
        let handler = PortalHandler::new(
            repositories,
            JwtGenerator::new(&JwtConfig::default()),
            PasswordHasher::default(),
        );

        let err = handler
            .login_user(
                Context::background(),
                LoginRequest {
                    username: "ghost".to_string(),
                    password: "whatever".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), ACCOUNT_NOT_FOUND);
    }
}
