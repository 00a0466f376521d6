pub mod health;
pub mod link;
pub mod redirect;
pub mod ui;

use actix_web::web;

pub use health::HealthService;
pub use link::{LinkService, ShortenRequest, ShortenResponse};
pub use redirect::RedirectService;
pub use ui::{UiPage, UiService};

/// 注册全部路由
///
/// `/{short}` 必须最后注册，否则会吞掉 `/healthz`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(HealthService::healthz))
        .route("/shorten", web::post().to(LinkService::shorten))
        .route("/delete/{short}", web::delete().to(LinkService::delete))
        .route("/", web::get().to(UiService::index))
        .route("/{short}", web::get().to(RedirectService::redirect));
}
