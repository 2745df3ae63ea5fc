//! Accounts and access control

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgConnection, Postgres};
use validator::Validate;

use super::by_id;
use crate::repository::{fetch_related, Entity};

/// A named capability, identified to clients by its `function_code`
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct Permission {
    pub id: Option<i64>,
    #[validate(length(min = 1))]
    pub permission_name: String,
    #[validate(length(min = 1))]
    pub function_code: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Permission {
    const TABLE: &'static str = "permissions";
    const NAME: &'static str = "Permission";
    const COLUMNS: &'static [&'static str] = &["permission_name", "function_code"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.permission_name.clone())
            .push_bind(self.function_code.clone());
    }
}

/// Set of permissions granted to users through roles
///
/// A group with `full_permission` is granted every permission regardless of roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct PermissionGroup {
    pub id: Option<i64>,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    pub full_permission: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for PermissionGroup {
    const TABLE: &'static str = "permission_groups";
    const NAME: &'static str = "PermissionGroup";
    const COLUMNS: &'static [&'static str] = &["name", "description", "full_permission"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.name.clone())
            .push_bind(self.description.clone())
            .push_bind(self.full_permission);
    }
}

/// Link between a permission group and one permission
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct Role {
    pub id: Option<i64>,
    #[validate(range(min = 1))]
    pub permission_id: i64,
    #[validate(range(min = 1))]
    pub permission_group_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub permission: Option<Permission>,
    #[sqlx(skip)]
    pub permission_group: Option<PermissionGroup>,
}

impl Entity for Role {
    const TABLE: &'static str = "roles";
    const NAME: &'static str = "Role";
    const COLUMNS: &'static [&'static str] = &["permission_id", "permission_group_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.permission_id)
            .push_bind(self.permission_group_id);
    }

    async fn load_associations(
        conn: &mut PgConnection,
        rows: &mut [Self],
    ) -> Result<(), sqlx::Error> {
        let permission_ids = rows.iter().map(|r| r.permission_id).collect();
        let permissions = by_id(fetch_related::<Permission>(conn, "id", permission_ids).await?);

        let group_ids = rows.iter().map(|r| r.permission_group_id).collect();
        let groups = by_id(fetch_related::<PermissionGroup>(conn, "id", group_ids).await?);

        for row in rows.iter_mut() {
            row.permission = permissions.get(&row.permission_id).cloned();
            row.permission_group = groups.get(&row.permission_group_id).cloned();
        }
        Ok(())
    }
}

/// Back-office account
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct User {
    pub id: Option<i64>,
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub username: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    #[validate(length(min = 1))]
    pub password: String,
    pub is_admin: bool,
    #[validate(range(min = 1, max = 2))]
    pub status: i32,
    pub receive_email: bool,
    pub permission_group_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub permission_group: Option<PermissionGroup>,
}

impl User {
    pub const STATUS_ACTIVE: i32 = 1;
    pub const STATUS_INACTIVE: i32 = 2;
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const NAME: &'static str = "User";
    const COLUMNS: &'static [&'static str] = &[
        "full_name",
        "email",
        "username",
        "password",
        "is_admin",
        "status",
        "receive_email",
        "permission_group_id",
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.full_name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.username.clone())
            .push_bind(self.password.clone())
            .push_bind(self.is_admin)
            .push_bind(self.status)
            .push_bind(self.receive_email)
            .push_bind(self.permission_group_id);
    }

    async fn load_associations(
        conn: &mut PgConnection,
        rows: &mut [Self],
    ) -> Result<(), sqlx::Error> {
        let group_ids = rows.iter().map(|u| u.permission_group_id).collect();
        let groups = by_id(fetch_related::<PermissionGroup>(conn, "id", group_ids).await?);

        for row in rows.iter_mut() {
            row.permission_group = groups.get(&row.permission_group_id).cloned();
        }
        Ok(())
    }
}

/// Issued access token, kept for revocation and audit
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct UserToken {
    pub id: Option<i64>,
    #[validate(range(min = 1))]
    pub user_id: i64,
    #[serde(skip_serializing)]
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    pub token_id: String,
    pub expired_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for UserToken {
    const TABLE: &'static str = "user_tokens";
    const NAME: &'static str = "UserToken";
    const COLUMNS: &'static [&'static str] = &["user_id", "token", "token_id", "expired_at"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.user_id)
            .push_bind(self.token.clone())
            .push_bind(self.token_id.clone())
            .push_bind(self.expired_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            full_name: "Nguyễn Văn A".to_string(),
            email: "a@example.com".to_string(),
            username: "admin".to_string(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            status: User::STATUS_ACTIVE,
            permission_group_id: 1,
            ..User::default()
        }
    }

    #[test]
    fn test_user_rules() {
        assert!(user().validate().is_ok());

        let mut bad_email = user();
        bad_email.email = "admin".to_string();
        assert!(bad_email.validate().is_err());

        let mut bad_status = user();
        bad_status.status = 0;
        assert!(bad_status.validate().is_err());
    }

    #[test]
    fn test_password_never_serialized() {
        let json = serde_json::to_value(user()).expect("serialize");
        assert!(json.get("password").is_none());
        assert!(json["permission_group"].is_null());
    }

    #[test]
    fn test_role_requires_both_links() {
        let role = Role {
            permission_id: 1,
            permission_group_id: 0,
            ..Role::default()
        };
        assert!(role.validate().is_err());
    }

    #[test]
    fn test_user_token_requires_token_fields() {
        let token = UserToken {
            user_id: 1,
            token: String::new(),
            token_id: "abc".to_string(),
            expired_at: Utc::now(),
            ..UserToken::default()
        };
        assert!(token.validate().is_err());
    }

    #[test]
    fn test_index_by_id_skips_unsaved_rows() {
        let saved = Permission {
            id: Some(4),
            permission_name: "view".to_string(),
            function_code: "VIEW".to_string(),
            ..Permission::default()
        };
        let unsaved = Permission::default();
        let index = by_id(vec![saved.clone(), unsaved]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&4), Some(&saved));
    }
}
