use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic_prost::ProstCodec";

fn method(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::proto::{}", input))
        .output_type(format!("crate::proto::{}", output))
        .codec_path(CODEC)
        .build()
}

fn main() {
    let auth = Service::builder()
        .name("PortalAuth")
        .package("portal.v1")
        .method(method("login", "Login", "LoginRequest", "LoginResponse"))
        .build();

    let banner = Service::builder()
        .name("PortalBanner")
        .package("portal.v1")
        .method(method(
            "get_list_banner",
            "GetListBanner",
            "GetListBannerRequest",
            "GetListBannerResponse",
        ))
        .method(method("get_banner", "GetBanner", "GetBannerRequest", "GetBannerResponse"))
        .build();

    let post = Service::builder()
        .name("PortalPost")
        .package("portal.v1")
        .method(method(
            "get_list_post",
            "GetListPost",
            "GetListPostRequest",
            "GetListPostResponse",
        ))
        .method(method("get_post", "GetPost", "GetPostRequest", "GetPostResponse"))
        .build();

    Builder::new().compile(&[auth, banner, post]);
}
