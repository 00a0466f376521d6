use std::path::PathBuf;

use actix_web::{HttpResponse, Responder, web};

use crate::logging::Logger;

/// Location of the single-page UI served at `/`.
///
/// The file is read on every request so it can be replaced while the
/// server runs.
#[derive(Debug, Clone)]
pub struct UiPage {
    path: PathBuf,
}

impl UiPage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

pub struct UiService;

impl UiService {
    pub async fn index(page: web::Data<UiPage>, logger: web::Data<Logger>) -> impl Responder {
        logger.info("Serving UI page", &[]);

        match tokio::fs::read(page.path()).await {
            Ok(content) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(content),
            Err(_) => {
                logger.error("UI not found", &[]);
                HttpResponse::NotFound().body("UI not found")
            }
        }
    }
}
