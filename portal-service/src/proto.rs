//! Wire messages and generated service stubs for package `portal.v1`
//!
//! Messages are declared with `prost` derives; client/server stubs for the
//! `PortalAuth`, `PortalBanner` and `PortalPost` services are generated by `build.rs`.
//! Field names double as the gateway's JSON names.

use serde::{Deserialize, Serialize};

pub mod portal_auth {
    include!(concat!(env!("OUT_DIR"), "/portal.v1.PortalAuth.rs"));
}

pub mod portal_banner {
    include!(concat!(env!("OUT_DIR"), "/portal.v1.PortalBanner.rs"));
}

pub mod portal_post {
    include!(concat!(env!("OUT_DIR"), "/portal.v1.PortalPost.rs"));
}

pub use portal_auth::{portal_auth_client::PortalAuthClient, portal_auth_server};
pub use portal_banner::{portal_banner_client::PortalBannerClient, portal_banner_server};
pub use portal_post::{portal_post_client::PortalPostClient, portal_post_server};

/// Structured detail attached to error statuses
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[prost(string, tag = "1")]
    pub details: String,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct LoginRequest {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub username: String,
    #[prost(string, tag = "2")]
    #[serde(default)]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Permission {
    #[prost(string, tag = "1")]
    pub function_code: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct User {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub username: String,
    #[prost(string, tag = "3")]
    pub email: String,
    #[prost(bool, tag = "4")]
    pub is_admin: bool,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct LoginResponse {
    #[prost(string, tag = "1")]
    pub access_token: String,
    #[prost(message, repeated, tag = "2")]
    pub permissions: Vec<Permission>,
    #[prost(string, tag = "3")]
    pub token_id: String,
    #[prost(message, optional, tag = "4")]
    pub user: Option<User>,
}

// ---------------------------------------------------------------------------
// Banners
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Resource {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(int32, tag = "2")]
    pub r#type: i32,
    #[prost(string, tag = "3")]
    pub url: String,
    #[prost(string, optional, tag = "4")]
    pub youtube_id: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Banner {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name_vi: String,
    #[prost(string, tag = "3")]
    pub name_en: String,
    #[prost(string, tag = "4")]
    pub name_zh: String,
    #[prost(string, optional, tag = "5")]
    pub description_vi: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub description_en: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub description_zh: Option<String>,
    #[prost(int32, optional, tag = "8")]
    pub position: Option<i32>,
    #[prost(int32, tag = "9")]
    pub status: i32,
    #[prost(message, optional, tag = "10")]
    pub resource: Option<Resource>,
    #[prost(string, optional, tag = "11")]
    pub link: Option<String>,
    #[prost(string, optional, tag = "12")]
    pub button_name_vi: Option<String>,
    #[prost(string, optional, tag = "13")]
    pub button_name_en: Option<String>,
    #[prost(string, optional, tag = "14")]
    pub button_name_zh: Option<String>,
    #[prost(bool, tag = "15")]
    pub has_content: bool,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct GetListBannerRequest {
    #[prost(int64, optional, tag = "1")]
    pub page: Option<i64>,
    #[prost(int64, optional, tag = "2")]
    pub limit: Option<i64>,
    #[prost(int32, optional, tag = "3")]
    pub status: Option<i32>,
    #[prost(string, optional, tag = "4")]
    pub name: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct GetListBannerResponse {
    #[prost(message, repeated, tag = "1")]
    pub banners: Vec<Banner>,
    #[prost(int64, tag = "2")]
    pub total_page: i64,
    #[prost(int64, tag = "3")]
    pub record_count: i64,
    #[prost(int64, tag = "4")]
    pub page: i64,
    #[prost(int64, tag = "5")]
    pub limit: i64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct GetBannerRequest {
    #[prost(int64, tag = "1")]
    pub banner_id: i64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct GetBannerResponse {
    #[prost(message, optional, tag = "1")]
    pub banner: Option<Banner>,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Category {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name_vi: String,
    #[prost(string, tag = "3")]
    pub name_en: String,
    #[prost(string, tag = "4")]
    pub name_zh: String,
    #[prost(string, optional, tag = "5")]
    pub router_vi: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub router_en: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub router_zh: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Post {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub title_vi: String,
    #[prost(string, tag = "3")]
    pub title_en: String,
    #[prost(string, tag = "4")]
    pub title_zh: String,
    #[prost(string, tag = "5")]
    pub slug_vi: String,
    #[prost(string, tag = "6")]
    pub slug_en: String,
    #[prost(string, tag = "7")]
    pub slug_zh: String,
    #[prost(string, optional, tag = "8")]
    pub description_vi: Option<String>,
    #[prost(string, optional, tag = "9")]
    pub description_en: Option<String>,
    #[prost(string, optional, tag = "10")]
    pub description_zh: Option<String>,
    #[prost(message, optional, tag = "11")]
    pub avatar: Option<Resource>,
    #[prost(string, tag = "12")]
    pub content_vi: String,
    #[prost(string, tag = "13")]
    pub content_en: String,
    #[prost(string, tag = "14")]
    pub content_zh: String,
    #[prost(int32, tag = "15")]
    pub status: i32,
    #[prost(int32, tag = "16")]
    pub r#type: i32,
    #[prost(bool, tag = "17")]
    pub flagship: bool,
    #[prost(message, optional, tag = "18")]
    pub category: Option<Category>,
    /// RFC 3339
    #[prost(string, optional, tag = "19")]
    pub public_date: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct GetListPostRequest {
    #[prost(int64, optional, tag = "1")]
    pub page: Option<i64>,
    #[prost(int64, optional, tag = "2")]
    pub limit: Option<i64>,
    #[prost(int32, optional, tag = "3")]
    pub status: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub r#type: Option<i32>,
    #[prost(int64, optional, tag = "5")]
    pub category_id: Option<i64>,
    #[prost(string, optional, tag = "6")]
    pub title: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct GetListPostResponse {
    #[prost(message, repeated, tag = "1")]
    pub posts: Vec<Post>,
    #[prost(int64, tag = "2")]
    pub total_page: i64,
    #[prost(int64, tag = "3")]
    pub record_count: i64,
    #[prost(int64, tag = "4")]
    pub page: i64,
    #[prost(int64, tag = "5")]
    pub limit: i64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct GetPostRequest {
    #[prost(int64, tag = "1")]
    pub post_id: i64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct GetPostResponse {
    #[prost(message, optional, tag = "1")]
    pub post: Option<Post>,
}
