pub mod health;
pub mod message;
pub mod photo;

use actix_web::{guard, middleware::DefaultHeaders, web, HttpResponse};
use uuid::Uuid;

use crate::errors::AppError;

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid data format: {}", err)).into()
    }))
    .service(
        web::resource("/api/{tail:.*}")
            .guard(guard::Options())
            .to(preflight),
    )
    .service(web::resource("/api/").route(web::get().to(health::health_check)))
    .service(
        web::resource("/api/photos")
            .route(web::get().to(photo::list_photos))
            .route(web::post().to(photo::create_photo)),
    )
    .service(
        web::resource("/api/photos/{id}")
            .route(web::get().to(photo::get_photo))
            .route(web::put().to(photo::update_photo))
            .route(web::delete().to(photo::delete_photo)),
    )
    .service(web::resource("/api/photos/{id}/file").route(web::get().to(photo::get_photo_file)))
    .service(
        web::resource("/api/messages")
            .route(web::get().to(message::list_messages))
            .route(web::post().to(message::create_message)),
    )
    .service(
        web::resource("/api/messages/{id}")
            .route(web::get().to(message::get_message))
            .route(web::put().to(message::update_message))
            .route(web::delete().to(message::delete_message)),
    );
}

/// Permissive CORS headers; the UI may be served from another origin.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Authorization, Content-Type"))
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", entity)))
}
