//! Portal content: banners, categories, posts, footers, partners, customers and the
//! media resources they reference

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgConnection, Postgres};
use validator::Validate;

use super::by_id;
use crate::repository::{fetch_related, Entity};

/// Homepage banner pointing at one media resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct Banner {
    pub id: Option<i64>,
    pub name_vi: String,
    pub name_en: String,
    pub name_zh: String,
    pub description_vi: Option<String>,
    pub description_en: Option<String>,
    pub description_zh: Option<String>,
    pub position: Option<i32>,
    #[validate(range(min = 1, max = 2))]
    pub status: i32,
    #[validate(range(min = 1))]
    pub resource_id: i64,
    pub link: Option<String>,
    pub button_name_vi: Option<String>,
    pub button_name_en: Option<String>,
    pub button_name_zh: Option<String>,
    pub has_content: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Banner {
    pub const STATUS_ACTIVE: i32 = 1;
    pub const STATUS_INACTIVE: i32 = 2;
}

impl Entity for Banner {
    const TABLE: &'static str = "banners";
    const NAME: &'static str = "Banner";
    const COLUMNS: &'static [&'static str] = &[
        "name_vi",
        "name_en",
        "name_zh",
        "description_vi",
        "description_en",
        "description_zh",
        "position",
        "status",
        "resource_id",
        "link",
        "button_name_vi",
        "button_name_en",
        "button_name_zh",
        "has_content",
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.name_vi.clone())
            .push_bind(self.name_en.clone())
            .push_bind(self.name_zh.clone())
            .push_bind(self.description_vi.clone())
            .push_bind(self.description_en.clone())
            .push_bind(self.description_zh.clone())
            .push_bind(self.position)
            .push_bind(self.status)
            .push_bind(self.resource_id)
            .push_bind(self.link.clone())
            .push_bind(self.button_name_vi.clone())
            .push_bind(self.button_name_en.clone())
            .push_bind(self.button_name_zh.clone())
            .push_bind(self.has_content);
    }
}

/// Post category; categories nest through `parent_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct Category {
    pub id: Option<i64>,
    #[validate(length(min = 1))]
    pub name_vi: String,
    #[validate(length(min = 1))]
    pub name_en: String,
    #[validate(length(min = 1))]
    pub name_zh: String,
    pub description_vi: Option<String>,
    pub description_en: Option<String>,
    pub description_zh: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    #[validate(range(min = 2, max = 3))]
    pub category_type: i32,
    pub editable: bool,
    pub router_vi: Option<String>,
    pub router_en: Option<String>,
    pub router_zh: Option<String>,
    pub position: Option<i64>,
    pub parent_id: Option<i64>,
    #[validate(range(min = 1, max = 2))]
    pub status: i32,
    pub resource_id: Option<i64>,
    #[validate(range(min = 1))]
    pub level: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub child_categories: Vec<Category>,
}

impl Category {
    pub const TYPE_DETAIL: i32 = 2;
    pub const TYPE_LIST: i32 = 3;
    pub const STATUS_ACTIVE: i32 = 1;
    pub const STATUS_INACTIVE: i32 = 2;
}

impl Entity for Category {
    const TABLE: &'static str = "categories";
    const NAME: &'static str = "Category";
    const COLUMNS: &'static [&'static str] = &[
        "name_vi",
        "name_en",
        "name_zh",
        "description_vi",
        "description_en",
        "description_zh",
        "type",
        "editable",
        "router_vi",
        "router_en",
        "router_zh",
        "position",
        "parent_id",
        "status",
        "resource_id",
        "level",
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.name_vi.clone())
            .push_bind(self.name_en.clone())
            .push_bind(self.name_zh.clone())
            .push_bind(self.description_vi.clone())
            .push_bind(self.description_en.clone())
            .push_bind(self.description_zh.clone())
            .push_bind(self.category_type)
            .push_bind(self.editable)
            .push_bind(self.router_vi.clone())
            .push_bind(self.router_en.clone())
            .push_bind(self.router_zh.clone())
            .push_bind(self.position)
            .push_bind(self.parent_id)
            .push_bind(self.status)
            .push_bind(self.resource_id)
            .push_bind(self.level);
    }

    /// One level of child categories
    async fn load_associations(
        conn: &mut PgConnection,
        rows: &mut [Self],
    ) -> Result<(), sqlx::Error> {
        let parents = rows.iter().filter_map(|c| c.id).collect();
        let children: Vec<Category> = fetch_related(conn, "parent_id", parents).await?;

        let mut by_parent: HashMap<i64, Vec<Category>> = HashMap::new();
        for child in children {
            if let Some(parent) = child.parent_id {
                by_parent.entry(parent).or_default().push(child);
            }
        }
        for row in rows.iter_mut() {
            row.child_categories = row
                .id
                .and_then(|id| by_parent.get(&id).cloned())
                .unwrap_or_default();
        }
        Ok(())
    }
}

/// Contact-form submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct Customer {
    pub id: Option<i64>,
    #[validate(length(min = 1))]
    pub customer_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub phone_number: String,
    pub company_name: Option<String>,
    pub message: Option<String>,
    pub note: Option<String>,
    #[validate(range(min = 1, max = 3))]
    pub service_type: i32,
    #[validate(range(min = 1, max = 2))]
    pub status: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    pub const SERVICE_RECRUITMENT: i32 = 1;
    pub const SERVICE_CONTACT: i32 = 2;
    pub const SERVICE_COURSE: i32 = 3;
    pub const STATUS_ANSWERED: i32 = 1;
    pub const STATUS_UNANSWERED: i32 = 2;
}

impl Entity for Customer {
    const TABLE: &'static str = "customers";
    const NAME: &'static str = "Customer";
    const COLUMNS: &'static [&'static str] = &[
        "customer_name",
        "email",
        "phone_number",
        "company_name",
        "message",
        "note",
        "service_type",
        "status",
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.customer_name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.phone_number.clone())
            .push_bind(self.company_name.clone())
            .push_bind(self.message.clone())
            .push_bind(self.note.clone())
            .push_bind(self.service_type)
            .push_bind(self.status);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct Footer {
    pub id: Option<i64>,
    #[validate(length(min = 1))]
    pub name_vi: String,
    #[validate(length(min = 1))]
    pub name_en: String,
    #[validate(length(min = 1))]
    pub name_zh: String,
    pub content_vi: Option<String>,
    pub content_en: Option<String>,
    pub content_zh: Option<String>,
    pub link: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Footer {
    const TABLE: &'static str = "footers";
    const NAME: &'static str = "Footer";
    const COLUMNS: &'static [&'static str] = &[
        "name_vi",
        "name_en",
        "name_zh",
        "content_vi",
        "content_en",
        "content_zh",
        "link",
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.name_vi.clone())
            .push_bind(self.name_en.clone())
            .push_bind(self.name_zh.clone())
            .push_bind(self.content_vi.clone())
            .push_bind(self.content_en.clone())
            .push_bind(self.content_zh.clone())
            .push_bind(self.link.clone());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct Partner {
    pub id: Option<i64>,
    #[validate(length(min = 1))]
    pub name: String,
    pub description_vi: Option<String>,
    pub description_en: Option<String>,
    pub description_zh: Option<String>,
    #[validate(range(min = 1, max = 2))]
    pub status: i32,
    pub position: Option<i32>,
    pub resource_id: i64,
    pub link: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Partner {
    pub const STATUS_ACTIVE: i32 = 1;
    pub const STATUS_INACTIVE: i32 = 2;
}

impl Entity for Partner {
    const TABLE: &'static str = "partners";
    const NAME: &'static str = "Partner";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "description_vi",
        "description_en",
        "description_zh",
        "status",
        "position",
        "resource_id",
        "link",
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.name.clone())
            .push_bind(self.description_vi.clone())
            .push_bind(self.description_en.clone())
            .push_bind(self.description_zh.clone())
            .push_bind(self.status)
            .push_bind(self.position)
            .push_bind(self.resource_id)
            .push_bind(self.link.clone());
    }
}

/// Article; soft-deleted through `deleted_at`
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct Post {
    pub id: Option<i64>,
    #[validate(length(min = 1))]
    pub title_vi: String,
    #[validate(length(min = 1))]
    pub title_en: String,
    #[validate(length(min = 1))]
    pub title_zh: String,
    #[validate(length(min = 1))]
    pub slug_vi: String,
    #[validate(length(min = 1))]
    pub slug_en: String,
    #[validate(length(min = 1))]
    pub slug_zh: String,
    #[validate(length(min = 1))]
    pub alt_vi: String,
    #[validate(length(min = 1))]
    pub alt_en: String,
    #[validate(length(min = 1))]
    pub alt_zh: String,
    pub description_vi: Option<String>,
    pub description_en: Option<String>,
    pub description_zh: Option<String>,
    /// Resource id of the cover image
    #[validate(range(min = 1))]
    pub avatar: i64,
    pub resource_ids: Option<String>,
    #[validate(length(min = 1))]
    pub content_vi: String,
    #[validate(length(min = 1))]
    pub content_en: String,
    #[validate(length(min = 1))]
    pub content_zh: String,
    #[validate(range(min = 1, max = 5))]
    pub status: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    #[validate(range(min = 1, max = 5))]
    pub post_type: i32,
    pub flagship: bool,
    pub color_palette: Option<String>,
    #[validate(range(min = 1))]
    pub category_id: i64,
    pub public_date: Option<DateTime<Utc>>,
    pub info_vi: Option<String>,
    pub info_en: Option<String>,
    pub info_zh: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub category: Option<Category>,
}

impl Post {
    pub const STATUS_DRAFT: i32 = 1;
    pub const STATUS_IN_REVIEW: i32 = 2;
    pub const STATUS_PUBLIC: i32 = 3;
    pub const STATUS_REJECTED: i32 = 4;
    pub const STATUS_REMOVED: i32 = 5;

    pub const TYPE_NEWS: i32 = 1;
    pub const TYPE_PRODUCT: i32 = 2;
    pub const TYPE_PROJECT: i32 = 3;
    pub const TYPE_TECHNOLOGY: i32 = 4;
    pub const TYPE_DELIVERY: i32 = 5;
}

impl Entity for Post {
    const TABLE: &'static str = "posts";
    const NAME: &'static str = "Post";
    const SOFT_DELETE: bool = true;
    const COLUMNS: &'static [&'static str] = &[
        "title_vi",
        "title_en",
        "title_zh",
        "slug_vi",
        "slug_en",
        "slug_zh",
        "alt_vi",
        "alt_en",
        "alt_zh",
        "description_vi",
        "description_en",
        "description_zh",
        "avatar",
        "resource_ids",
        "content_vi",
        "content_en",
        "content_zh",
        "status",
        "type",
        "flagship",
        "color_palette",
        "category_id",
        "public_date",
        "info_vi",
        "info_en",
        "info_zh",
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.title_vi.clone())
            .push_bind(self.title_en.clone())
            .push_bind(self.title_zh.clone())
            .push_bind(self.slug_vi.clone())
            .push_bind(self.slug_en.clone())
            .push_bind(self.slug_zh.clone())
            .push_bind(self.alt_vi.clone())
            .push_bind(self.alt_en.clone())
            .push_bind(self.alt_zh.clone())
            .push_bind(self.description_vi.clone())
            .push_bind(self.description_en.clone())
            .push_bind(self.description_zh.clone())
            .push_bind(self.avatar)
            .push_bind(self.resource_ids.clone())
            .push_bind(self.content_vi.clone())
            .push_bind(self.content_en.clone())
            .push_bind(self.content_zh.clone())
            .push_bind(self.status)
            .push_bind(self.post_type)
            .push_bind(self.flagship)
            .push_bind(self.color_palette.clone())
            .push_bind(self.category_id)
            .push_bind(self.public_date)
            .push_bind(self.info_vi.clone())
            .push_bind(self.info_en.clone())
            .push_bind(self.info_zh.clone());
    }

    async fn load_associations(
        conn: &mut PgConnection,
        rows: &mut [Self],
    ) -> Result<(), sqlx::Error> {
        let ids = rows.iter().map(|p| p.category_id).collect();
        let categories = by_id(fetch_related::<Category>(conn, "id", ids).await?);

        for row in rows.iter_mut() {
            row.category = categories.get(&row.category_id).cloned();
        }
        Ok(())
    }
}

/// Uploaded image or video
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, Validate)]
pub struct Resource {
    pub id: Option<i64>,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    #[validate(range(min = 1, max = 2))]
    pub resource_type: i32,
    #[validate(length(min = 1))]
    pub url: String,
    pub youtube_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource {
    pub const TYPE_IMAGE: i32 = 1;
    pub const TYPE_VIDEO: i32 = 2;
}

impl Entity for Resource {
    const TABLE: &'static str = "resources";
    const NAME: &'static str = "Resource";
    const COLUMNS: &'static [&'static str] = &["name", "description", "type", "url", "youtube_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.name.clone())
            .push_bind(self.description.clone())
            .push_bind(self.resource_type)
            .push_bind(self.url.clone())
            .push_bind(self.youtube_id.clone());
    }
}

#[cfg(test)]
impl Footer {
    /// Footer with every required name set to `name`
    pub(crate) fn named(name: &str) -> Self {
        Self {
            name_vi: name.to_string(),
            name_en: name.to_string(),
            name_zh: name.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl Resource {
    pub(crate) fn image(name: &str) -> Self {
        Self {
            name: name.to_string(),
            resource_type: Self::TYPE_IMAGE,
            url: format!("https://cdn.example.com/{name}.png"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl Category {
    pub(crate) fn list(name: &str) -> Self {
        Self {
            name_vi: name.to_string(),
            name_en: name.to_string(),
            name_zh: name.to_string(),
            category_type: Self::TYPE_LIST,
            editable: true,
            status: Self::STATUS_ACTIVE,
            level: 1,
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl Post {
    /// Draft post with every required text field set to `title`
    pub(crate) fn draft(title: &str, category_id: i64, avatar: i64) -> Self {
        let text = title.to_string();
        Self {
            title_vi: text.clone(),
            title_en: text.clone(),
            title_zh: text.clone(),
            slug_vi: text.clone(),
            slug_en: text.clone(),
            slug_zh: text.clone(),
            alt_vi: text.clone(),
            alt_en: text.clone(),
            alt_zh: text.clone(),
            avatar,
            content_vi: text.clone(),
            content_en: text.clone(),
            content_zh: text,
            status: Self::STATUS_DRAFT,
            post_type: Self::TYPE_NEWS,
            category_id,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner() -> Banner {
        Banner {
            name_vi: "Mùa xuân".to_string(),
            status: Banner::STATUS_ACTIVE,
            resource_id: 7,
            ..Banner::default()
        }
    }

    #[test]
    fn test_banner_rules() {
        assert!(banner().validate().is_ok());

        let mut bad_status = banner();
        bad_status.status = 3;
        assert!(bad_status.validate().is_err());

        let mut no_resource = banner();
        no_resource.resource_id = 0;
        assert!(no_resource.validate().is_err());
    }

    #[test]
    fn test_category_type_is_detail_or_list() {
        let mut category = Category::list("news");
        assert!(category.validate().is_ok());

        category.category_type = 1;
        assert!(category.validate().is_err());
        category.category_type = Category::TYPE_DETAIL;
        assert!(category.validate().is_ok());
    }

    #[test]
    fn test_customer_requires_valid_email() {
        let mut customer = Customer {
            customer_name: "Lan".to_string(),
            email: "lan@example.com".to_string(),
            phone_number: "0900000000".to_string(),
            service_type: Customer::SERVICE_CONTACT,
            status: Customer::STATUS_UNANSWERED,
            ..Customer::default()
        };
        assert!(customer.validate().is_ok());

        customer.email = "not-an-email".to_string();
        assert!(customer.validate().is_err());
    }

    #[test]
    fn test_footer_names_required() {
        assert!(Footer::named("Liên hệ").validate().is_ok());
        assert!(Footer::named("").validate().is_err());
    }

    #[test]
    fn test_post_draft_is_valid_and_status_bounded() {
        let mut post = Post::draft("hello", 1, 1);
        assert!(post.validate().is_ok());

        post.status = 6;
        assert!(post.validate().is_err());
    }

    #[test]
    fn test_resource_type_bounded() {
        let mut resource = Resource::image("logo");
        assert!(resource.validate().is_ok());
        resource.resource_type = 3;
        assert!(resource.validate().is_err());
    }

    #[test]
    fn test_column_lists_are_valid_identifiers() {
        for column in Banner::COLUMNS
            .iter()
            .chain(Category::COLUMNS)
            .chain(Customer::COLUMNS)
            .chain(Footer::COLUMNS)
            .chain(Partner::COLUMNS)
            .chain(Post::COLUMNS)
            .chain(Resource::COLUMNS)
        {
            assert!(
                crate::repository::condition::validate_identifier(column).is_ok(),
                "{column}"
            );
        }
    }

    #[test]
    fn test_optional_fields_serialize_as_null() {
        let json = serde_json::to_value(Footer::named("a")).expect("serialize");
        assert!(json["link"].is_null());
        assert_eq!(json["name_vi"], "a");
    }
}
