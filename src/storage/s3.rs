use async_trait::async_trait;
use aws_config::{BehaviorVersion, ConfigLoader};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use aws_types::region::Region;

use super::BlobStore;
use crate::errors::AppError;

pub async fn create_s3_client(region: Option<String>) -> S3Client {
    let aws_config = ConfigLoader::default()
        .region(region.map(Region::new))
        .behavior_version(BehaviorVersion::latest())
        .load()
        .await;

    S3Client::new(&aws_config)
}

/// Keeps blobs in a bucket under the `photos/` prefix.
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        S3BlobStore {
            client,
            bucket: bucket.into(),
        }
    }

    fn object_key(key: &str) -> String {
        format!("photos/{}", key)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(Self::object_key(key))
            .content_type(content_type)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|err| {
                log::error!("Failed to upload {} to S3: {:?}", key, err);
                AppError::StorageError(err.to_string())
            })?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(Self::object_key(key))
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                log::error!("Failed to fetch {} from S3: {:?}", key, service_err);
                return Err(AppError::StorageError(service_err.to_string()));
            }
        };

        let data = output.body.collect().await.map_err(|err| {
            log::error!("Failed to read S3 object body for {}: {:?}", key, err);
            AppError::StorageError(err.to_string())
        })?;
        Ok(Some(data.into_bytes().to_vec()))
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(Self::object_key(key))
            .send()
            .await
            .map_err(|err| {
                log::error!("Failed to delete {} from S3: {:?}", key, err);
                AppError::StorageError(err.to_string())
            })?;
        Ok(true)
    }
}
