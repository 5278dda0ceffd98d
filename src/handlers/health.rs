use actix_web::HttpResponse;
use serde_json::json;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Digital Photo Album API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy",
    }))
}
