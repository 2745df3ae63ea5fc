//! `PortalBanner` service

use std::collections::HashMap;

use tonic::{Request, Response, Status};

use super::{resource_message, serve, PortalHandler};
use crate::context::Context;
use crate::domain::{by_id, Banner, Resource};
use crate::error::DomainResult;
use crate::proto::{
    self, portal_banner_server::PortalBanner, GetBannerRequest, GetBannerResponse,
    GetListBannerRequest, GetListBannerResponse,
};
use crate::repository::{Condition, Pagination};

#[tonic::async_trait]
impl PortalBanner for PortalHandler {
    async fn get_list_banner(
        &self,
        request: Request<GetListBannerRequest>,
    ) -> Result<Response<GetListBannerResponse>, Status> {
        serve("PortalBanner/GetListBanner", request, |ctx, req| self.list_banners(ctx, req)).await
    }

    async fn get_banner(
        &self,
        request: Request<GetBannerRequest>,
    ) -> Result<Response<GetBannerResponse>, Status> {
        serve("PortalBanner/GetBanner", request, |ctx, req| self.banner(ctx, req)).await
    }
}

impl PortalHandler {
    async fn list_banners(
        &self,
        ctx: Context,
        req: GetListBannerRequest,
    ) -> DomainResult<GetListBannerResponse> {
        let pagination = Pagination::new(req.page, req.limit);
        let conditions = banner_filters(&req);

        let (banners, total) = self
            .repositories
            .banner_repository()
            .find_by_conditions_with_pagination(&ctx, pagination, &conditions)
            .await?;

        let resources = self.banner_resources(&ctx, &banners).await?;

        Ok(GetListBannerResponse {
            banners: banners
                .iter()
                .map(|banner| banner_message(banner, resources.get(&banner.resource_id)))
                .collect(),
            total_page: pagination.total_pages(total),
            record_count: total,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    async fn banner(&self, ctx: Context, req: GetBannerRequest) -> DomainResult<GetBannerResponse> {
        let banner = self
            .repositories
            .banner_repository()
            .take_by_conditions(&ctx, &[Condition::eq("id", req.banner_id)])
            .await?;

        let resource = self
            .repositories
            .resource_repository()
            .take_by_conditions(&ctx, &[Condition::eq("id", banner.resource_id)])
            .await?;

        Ok(GetBannerResponse {
            banner: Some(banner_message(&banner, Some(&resource))),
        })
    }

    /// Resources of a page of banners, in one query
    async fn banner_resources(
        &self,
        ctx: &Context,
        banners: &[Banner],
    ) -> DomainResult<HashMap<i64, Resource>> {
        // An empty IN matches everything
        if banners.is_empty() {
            return Ok(HashMap::new());
        }

        let resources = self
            .repositories
            .resource_repository()
            .find_by_conditions(
                ctx,
                &[Condition::is_in("id", banners.iter().map(|b| b.resource_id))],
            )
            .await?;
        Ok(by_id(resources))
    }
}

fn banner_filters(req: &GetListBannerRequest) -> Vec<Condition> {
    let mut conditions = vec![Condition::preload_associations()];

    if let Some(status) = req.status {
        conditions.push(Condition::eq("status", status));
    }
    if let Some(name) = req.name.as_deref() {
        conditions.push(Condition::or(
            ["name_vi", "name_en", "name_zh"]
                .into_iter()
                .map(|column| Condition::like(column, name))
                .collect(),
        ));
    }

    conditions
}

fn banner_message(banner: &Banner, resource: Option<&Resource>) -> proto::Banner {
    proto::Banner {
        id: banner.id.unwrap_or_default(),
        name_vi: banner.name_vi.clone(),
        name_en: banner.name_en.clone(),
        name_zh: banner.name_zh.clone(),
        description_vi: banner.description_vi.clone(),
        description_en: banner.description_en.clone(),
        description_zh: banner.description_zh.clone(),
        position: banner.position,
        status: banner.status,
        resource: resource.map(resource_message),
        link: banner.link.clone(),
        button_name_vi: banner.button_name_vi.clone(),
        button_name_en: banner.button_name_en.clone(),
        button_name_zh: banner.button_name_zh.clone(),
        has_content: banner.has_content,
    }
}
