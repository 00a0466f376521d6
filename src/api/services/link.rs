//! Link creation and deletion

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::logging::Logger;
use crate::shortener::Shortener;
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short: String,
}

pub struct LinkService;

impl LinkService {
    /// `POST /shorten`
    ///
    /// 请求体自行解析，JSON 错误和空 url 统一返回 400
    pub async fn shorten(
        body: web::Bytes,
        store: web::Data<Arc<dyn Store>>,
        shortener: web::Data<Arc<dyn Shortener>>,
        logger: web::Data<Logger>,
    ) -> impl Responder {
        let request = match serde_json::from_slice::<ShortenRequest>(&body) {
            Ok(req) if !req.url.is_empty() => req,
            Ok(_) => {
                logger.error("Invalid shorten request", &[("error", json!("url is empty"))]);
                return HttpResponse::BadRequest().finish();
            }
            Err(e) => {
                logger.error("Invalid shorten request", &[("error", json!(e.to_string()))]);
                return HttpResponse::BadRequest().finish();
            }
        };

        let short = shortener.shorten(&request.url);
        if let Err(e) = store.set(&short, &request.url).await {
            logger.error(
                "Failed to store short URL",
                &[("short", json!(short)), ("error", json!(e.to_string()))],
            );
            return HttpResponse::InternalServerError().finish();
        }

        logger.info(
            "Shortened URL",
            &[("short", json!(short)), ("long", json!(request.url))],
        );
        HttpResponse::Ok().json(ShortenResponse { short })
    }

    /// `DELETE /delete/{short}`
    pub async fn delete(
        path: web::Path<String>,
        store: web::Data<Arc<dyn Store>>,
        logger: web::Data<Logger>,
    ) -> impl Responder {
        let short = path.into_inner();

        match store.delete(&short).await {
            Ok(()) => {
                logger.info("Deleted short URL", &[("short", json!(short))]);
                HttpResponse::NoContent().finish()
            }
            Err(e) => {
                logger.error(
                    "Failed to delete short URL",
                    &[("short", json!(short)), ("error", json!(e.to_string()))],
                );
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}
