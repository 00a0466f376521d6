use actix_web::{HttpResponse, Responder, web};

use crate::logging::Logger;

pub struct HealthService;

impl HealthService {
    pub async fn healthz(logger: web::Data<Logger>) -> impl Responder {
        logger.info("Health check endpoint hit", &[]);
        HttpResponse::Ok().finish()
    }
}
