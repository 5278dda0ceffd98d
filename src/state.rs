use actix_web::HttpRequest;
use std::sync::Arc;

use crate::db::{MemoryStore, MessageRepository, PhotoRepository};
use crate::errors::AppError;
use crate::storage::BlobStore;
use crate::utils::jwt;

/// Shared by every worker; registered as `web::Data<AppState>`.
pub struct AppState {
    pub photos: Arc<dyn PhotoRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub blobs: Arc<dyn BlobStore>,
    pub jwt_secret: Option<String>,
}

impl AppState {
    pub fn in_memory(blobs: Arc<dyn BlobStore>, jwt_secret: Option<String>) -> Self {
        let store = Arc::new(MemoryStore::new());
        AppState {
            photos: store.clone(),
            messages: store,
            blobs,
            jwt_secret,
        }
    }

    pub fn authorize(&self, req: &HttpRequest) -> Result<(), AppError> {
        jwt::authorize(req, self.jwt_secret.as_deref()).map(|_| ())
    }
}
