pub mod local;
pub mod s3;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::errors::AppError;

pub use local::LocalBlobStore;
pub use s3::S3BlobStore;

/// Stores photo bytes under opaque keys produced by [`blob_key`].
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), AppError>;
    /// Returns `None` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;
    /// Returns whether a blob was removed.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;
}

/// `YYYY/MM/{id}.{ext}`, grouped by the photo's date.
pub fn blob_key(date: NaiveDate, id: Uuid, extension: &str) -> String {
    format!("{}/{:02}/{}.{}", date.year(), date.month(), id, extension)
}
