//! Client side of the album: the REST client plus the state a UI keeps
//! between user actions.

pub mod album;
pub mod api;
pub mod error;
pub mod tags;
pub mod upload;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::message::{Message, MessageUpdate, NewMessage};
use crate::models::photo::{Photo, PhotoUpdate};

pub use album::Album;
pub use api::{ApiClient, PhotoUpload};
pub use error::ClientError;
pub use tags::{TagError, TagSet};
pub use upload::{SelectedFile, UploadFlow, UploadForm, UploadState};

/// The operations the album state needs from the backend.
#[async_trait]
pub trait AlbumBackend: Send + Sync {
    async fn list_photos(&self) -> Result<Vec<Photo>, ClientError>;
    async fn get_photo(&self, id: Uuid) -> Result<Photo, ClientError>;
    async fn upload_photo(&self, upload: PhotoUpload) -> Result<Photo, ClientError>;
    async fn update_photo(&self, id: Uuid, update: &PhotoUpdate) -> Result<Photo, ClientError>;
    async fn delete_photo(&self, id: Uuid) -> Result<(), ClientError>;
    async fn list_messages(&self) -> Result<Vec<Message>, ClientError>;
    async fn create_message(&self, message: &NewMessage) -> Result<Message, ClientError>;
    async fn update_message(&self, id: Uuid, update: &MessageUpdate) -> Result<Message, ClientError>;
    async fn delete_message(&self, id: Uuid) -> Result<(), ClientError>;
}
