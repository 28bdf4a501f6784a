use actix_web::{HttpResponse, Responder};
use serde_json::json;

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "message": "Server is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
