use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::{AlbumBackend, ClientError};
use crate::models::message::{Message, MessageUpdate, NewMessage};
use crate::models::photo::{Photo, PhotoUpdate};
use crate::utils::validation::check_image;

pub const READ_TIMEOUT: Duration = Duration::from_secs(30);
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything `POST /api/photos` needs: the image and its metadata.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub title: String,
    pub caption: String,
    pub memory_note: String,
    pub date: NaiveDate,
    pub location: String,
    pub tags: Vec<String>,
}

impl PhotoUpload {
    /// Local checks that must pass before anything is sent.
    pub fn check(&self) -> Result<(), ClientError> {
        check_image(&self.mime_type, self.bytes.len()).map_err(|err| ClientError::Validation(err.to_string()))?;
        if self.title.trim().is_empty() || self.caption.trim().is_empty() {
            return Err(ClientError::Validation("Title and caption are required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Acknowledgement returned by photo deletion.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PhotoDeleted {
    pub message: String,
    pub file_deleted: bool,
}

/// HTTP client for the album REST API. One request per call, no retries.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_base: Url,
    token: Option<String>,
    read_timeout: Duration,
    upload_timeout: Duration,
}

impl ApiClient {
    /// `backend_url` is the host root; routes live under `{backend_url}/api/`.
    pub fn new(backend_url: &str) -> Result<Self, ClientError> {
        let mut root = Url::parse(backend_url.trim())?;
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let api_base = root.join("api/")?;

        Ok(ApiClient {
            http: reqwest::Client::new(),
            api_base,
            token: None,
            read_timeout: READ_TIMEOUT,
            upload_timeout: UPLOAD_TIMEOUT,
        })
    }

    /// Reads `PHOTO_ALBUM_BACKEND_URL` and the optional `PHOTO_ALBUM_TOKEN`.
    pub fn from_env() -> Result<Self, ClientError> {
        let backend_url = env::var("PHOTO_ALBUM_BACKEND_URL")
            .map_err(|_| ClientError::Config("PHOTO_ALBUM_BACKEND_URL must be set".to_string()))?;
        let client = Self::new(&backend_url)?;
        Ok(match env::var("PHOTO_ALBUM_TOKEN") {
            Ok(token) if !token.trim().is_empty() => client.with_token(token.trim()),
            _ => client,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeouts(mut self, read: Duration, upload: Duration) -> Self {
        self.read_timeout = read;
        self.upload_timeout = upload;
        self
    }

    /// `{base}/api/photos/{id}/file`
    pub fn photo_file_url(&self, id: Uuid) -> String {
        format!("{}photos/{}/file", self.api_base, id)
    }

    fn request(&self, method: Method, path: &str, timeout: Duration) -> Result<RequestBuilder, ClientError> {
        let url = self.api_base.join(path)?;
        let builder = self.http.request(method, url).timeout(timeout);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await.map_err(|err| {
            log::error!("Request to album API failed: {}", err);
            ClientError::Transport(err)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response.json::<ErrorBody>().await.ok().map(|body| body.detail);
        log::error!("Album API returned {}: {:?}", status, detail);
        Err(ClientError::Server {
            status: status.as_u16(),
            detail,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = self.execute(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))
    }

    pub async fn fetch_photo_file(&self, id: Uuid) -> Result<Vec<u8>, ClientError> {
        let builder = self.request(Method::GET, &format!("photos/{}/file", id), self.read_timeout)?;
        let response = self.execute(builder).await?;
        let bytes = response.bytes().await.map_err(ClientError::Transport)?;
        Ok(bytes.to_vec())
    }

    pub async fn get_message(&self, id: Uuid) -> Result<Message, ClientError> {
        let builder = self.request(Method::GET, &format!("messages/{}", id), self.read_timeout)?;
        self.fetch_json(builder).await
    }

    pub async fn delete_photo_with_ack(&self, id: Uuid) -> Result<PhotoDeleted, ClientError> {
        let builder = self.request(Method::DELETE, &format!("photos/{}", id), self.read_timeout)?;
        self.fetch_json(builder).await
    }
}

#[async_trait]
impl AlbumBackend for ApiClient {
    async fn list_photos(&self) -> Result<Vec<Photo>, ClientError> {
        let builder = self.request(Method::GET, "photos", self.read_timeout)?;
        self.fetch_json(builder).await
    }

    async fn get_photo(&self, id: Uuid) -> Result<Photo, ClientError> {
        let builder = self.request(Method::GET, &format!("photos/{}", id), self.read_timeout)?;
        self.fetch_json(builder).await
    }

    async fn upload_photo(&self, upload: PhotoUpload) -> Result<Photo, ClientError> {
        upload.check()?;

        let tags = serde_json::to_string(&upload.tags).map_err(|err| ClientError::Encode(err.to_string()))?;
        let file = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)
            .map_err(ClientError::Transport)?;
        let form = Form::new()
            .part("file", file)
            .text("title", upload.title.trim().to_string())
            .text("caption", upload.caption.trim().to_string())
            .text("memory_note", upload.memory_note)
            .text("date", upload.date.format("%Y-%m-%d").to_string())
            .text("location", upload.location)
            .text("tags", tags);

        let builder = self
            .request(Method::POST, "photos", self.upload_timeout)?
            .multipart(form);
        self.fetch_json(builder).await
    }

    async fn update_photo(&self, id: Uuid, update: &PhotoUpdate) -> Result<Photo, ClientError> {
        let builder = self
            .request(Method::PUT, &format!("photos/{}", id), self.read_timeout)?
            .json(update);
        self.fetch_json(builder).await
    }

    async fn delete_photo(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete_photo_with_ack(id).await.map(|_| ())
    }

    async fn list_messages(&self) -> Result<Vec<Message>, ClientError> {
        let builder = self.request(Method::GET, "messages", self.read_timeout)?;
        self.fetch_json(builder).await
    }

    async fn create_message(&self, message: &NewMessage) -> Result<Message, ClientError> {
        let builder = self
            .request(Method::POST, "messages", self.read_timeout)?
            .json(message);
        self.fetch_json(builder).await
    }

    async fn update_message(&self, id: Uuid, update: &MessageUpdate) -> Result<Message, ClientError> {
        let builder = self
            .request(Method::PUT, &format!("messages/{}", id), self.read_timeout)?
            .json(update);
        self.fetch_json(builder).await
    }

    async fn delete_message(&self, id: Uuid) -> Result<(), ClientError> {
        let builder = self.request(Method::DELETE, &format!("messages/{}", id), self.read_timeout)?;
        self.execute(builder).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_url_is_deterministic() {
        let id = Uuid::new_v4();
        let client = ApiClient::new("http://localhost:8080").unwrap();
        assert_eq!(client.photo_file_url(id), format!("http://localhost:8080/api/photos/{}/file", id));

        let prefixed = ApiClient::new("https://example.com/album/").unwrap();
        assert_eq!(
            prefixed.photo_file_url(id),
            format!("https://example.com/album/api/photos/{}/file", id)
        );
    }

    #[test]
    fn bad_backend_url_is_a_config_error() {
        assert!(matches!(ApiClient::new("not a url"), Err(ClientError::Config(_))));
    }
}
