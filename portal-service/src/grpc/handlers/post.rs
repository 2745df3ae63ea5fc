//! `PortalPost` service

use std::collections::HashMap;

use tonic::{Request, Response, Status};

use super::{resource_message, serve, PortalHandler};
use crate::context::Context;
use crate::domain::{by_id, Category, Post, Resource};
use crate::error::DomainResult;
use crate::proto::{
    self, portal_post_server::PortalPost, GetListPostRequest, GetListPostResponse,
    GetPostRequest, GetPostResponse,
};
use crate::repository::{Condition, Pagination};

#[tonic::async_trait]
impl PortalPost for PortalHandler {
    async fn get_list_post(
        &self,
        request: Request<GetListPostRequest>,
    ) -> Result<Response<GetListPostResponse>, Status> {
        serve("PortalPost/GetListPost", request, |ctx, req| self.list_posts(ctx, req)).await
    }

    async fn get_post(
        &self,
        request: Request<GetPostRequest>,
    ) -> Result<Response<GetPostResponse>, Status> {
        serve("PortalPost/GetPost", request, |ctx, req| self.post(ctx, req)).await
    }
}

impl PortalHandler {
    async fn list_posts(&self, ctx: Context, req: GetListPostRequest) -> DomainResult<GetListPostResponse> {
        let pagination = Pagination::new(req.page, req.limit);

        let (posts, total) = self
            .repositories
            .post_repository()
            .find_by_conditions_with_pagination(&ctx, pagination, &post_filters(&req))
            .await?;

        let avatars = self.avatars(&ctx, &posts).await?;

        Ok(GetListPostResponse {
            posts: posts
                .iter()
                .map(|post| post_message(post, avatars.get(&post.avatar)))
                .collect(),
            total_page: pagination.total_pages(total),
            record_count: total,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    async fn post(&self, ctx: Context, req: GetPostRequest) -> DomainResult<GetPostResponse> {
        let post = self
            .repositories
            .post_repository()
            .take_by_conditions(
                &ctx,
                &[Condition::eq("id", req.post_id), Condition::preload_associations()],
            )
            .await?;

        let avatar = self
            .repositories
            .resource_repository()
            .take_by_conditions(&ctx, &[Condition::eq("id", post.avatar)])
            .await?;

        Ok(GetPostResponse {
            post: Some(post_message(&post, Some(&avatar))),
        })
    }

    async fn avatars(&self, ctx: &Context, posts: &[Post]) -> DomainResult<HashMap<i64, Resource>> {
        if posts.is_empty() {
            return Ok(HashMap::new());
        }

        let resources = self
            .repositories
            .resource_repository()
            .find_by_conditions(ctx, &[Condition::is_in("id", posts.iter().map(|p| p.avatar))])
            .await?;
        Ok(by_id(resources))
    }
}

fn post_filters(req: &GetListPostRequest) -> Vec<Condition> {
    let mut conditions = vec![Condition::preload_associations()];

    if let Some(status) = req.status {
        conditions.push(Condition::eq("status", status));
    }
    if let Some(post_type) = req.r#type {
        conditions.push(Condition::eq("type", post_type));
    }
    if let Some(category_id) = req.category_id {
        conditions.push(Condition::eq("category_id", category_id));
    }
    if let Some(title) = req.title.as_deref() {
        conditions.push(Condition::or(
            ["title_vi", "title_en", "title_zh"]
                .into_iter()
                .map(|column| Condition::like(column, title))
                .collect(),
        ));
    }

    conditions
}

fn category_message(category: &Category) -> proto::Category {
    proto::Category {
        id: category.id.unwrap_or_default(),
        name_vi: category.name_vi.clone(),
        name_en: category.name_en.clone(),
        name_zh: category.name_zh.clone(),
        router_vi: category.router_vi.clone(),
        router_en: category.router_en.clone(),
        router_zh: category.router_zh.clone(),
    }
}

fn post_message(post: &Post, avatar: Option<&Resource>) -> proto::Post {
    proto::Post {
        id: post.id.unwrap_or_default(),
        title_vi: post.title_vi.clone(),
        title_en: post.title_en.clone(),
        title_zh: post.title_zh.clone(),
        slug_vi: post.slug_vi.clone(),
        slug_en: post.slug_en.clone(),
        slug_zh: post.slug_zh.clone(),
        description_vi: post.description_vi.clone(),
        description_en: post.description_en.clone(),
        description_zh: post.description_zh.clone(),
        avatar: avatar.map(resource_message),
        content_vi: post.content_vi.clone(),
        content_en: post.content_en.clone(),
        content_zh: post.content_zh.clone(),
        status: post.status,
        r#type: post.post_type,
        flagship: post.flagship,
        category: post.category.as_ref().map(category_message),
        public_date: post.public_date.map(|date| date.to_rfc3339()),
    }
}
