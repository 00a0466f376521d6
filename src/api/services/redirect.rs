use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::logging::Logger;
use crate::store::Store;

pub struct RedirectService;

impl RedirectService {
    /// `GET /{short}`: 302 to the stored URL, 404 when unknown.
    pub async fn redirect(
        path: web::Path<String>,
        store: web::Data<Arc<dyn Store>>,
        logger: web::Data<Logger>,
    ) -> impl Responder {
        let short = path.into_inner();

        match store.get(&short).await {
            Ok(Some(long)) => {
                logger.info(
                    "Redirecting short URL",
                    &[("short", json!(short)), ("long", json!(long))],
                );
                HttpResponse::Found()
                    .insert_header(("Location", long))
                    .finish()
            }
            Ok(None) => {
                logger.error("Short URL not found", &[("short", json!(short))]);
                HttpResponse::NotFound().finish()
            }
            Err(e) => {
                logger.error(
                    "Failed to look up short URL",
                    &[("short", json!(short)), ("error", json!(e.to_string()))],
                );
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}
