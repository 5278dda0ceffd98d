use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MessageRepository, PhotoRepository};
use crate::errors::AppError;
use crate::models::message::{Message, MessageUpdate};
use crate::models::photo::{Photo, PhotoChanges};

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    photos: RwLock<Vec<Photo>>,
    messages: RwLock<Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PhotoRepository for MemoryStore {
    async fn list_photos(&self) -> Result<Vec<Photo>, AppError> {
        let mut photos = self.photos.read().await.clone();
        photos.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(photos)
    }

    async fn find_photo(&self, id: Uuid) -> Result<Option<Photo>, AppError> {
        let photos = self.photos.read().await;
        Ok(photos.iter().find(|photo| photo.id == id).cloned())
    }

    async fn insert_photo(&self, photo: &Photo) -> Result<(), AppError> {
        let mut photos = self.photos.write().await;
        if photos.iter().any(|existing| existing.id == photo.id) {
            return Err(AppError::DatabaseError(format!("duplicate photo id {}", photo.id)));
        }
        photos.push(photo.clone());
        Ok(())
    }

    async fn update_photo(&self, id: Uuid, changes: &PhotoChanges) -> Result<Option<Photo>, AppError> {
        let mut photos = self.photos.write().await;
        Ok(photos.iter_mut().find(|photo| photo.id == id).map(|photo| {
            photo.apply(changes, Utc::now());
            photo.clone()
        }))
    }

    async fn delete_photo(&self, id: Uuid) -> Result<bool, AppError> {
        let mut photos = self.photos.write().await;
        let before = photos.len();
        photos.retain(|photo| photo.id != id);
        Ok(photos.len() != before)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn list_messages(&self) -> Result<Vec<Message>, AppError> {
        let mut messages = self.messages.read().await.clone();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn find_message(&self, id: Uuid) -> Result<Option<Message>, AppError> {
        let messages = self.messages.read().await;
        Ok(messages.iter().find(|message| message.id == id).cloned())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        let mut messages = self.messages.write().await;
        if messages.iter().any(|existing| existing.id == message.id) {
            return Err(AppError::DatabaseError(format!("duplicate message id {}", message.id)));
        }
        messages.push(message.clone());
        Ok(())
    }

    async fn update_message(&self, id: Uuid, update: &MessageUpdate) -> Result<Option<Message>, AppError> {
        let mut messages = self.messages.write().await;
        Ok(messages.iter_mut().find(|message| message.id == id).map(|message| {
            message.apply(update, Utc::now());
            message.clone()
        }))
    }

    async fn delete_message(&self, id: Uuid) -> Result<bool, AppError> {
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|message| message.id != id);
        Ok(messages.len() != before)
    }

    async fn count_messages(&self) -> Result<i64, AppError> {
        Ok(self.messages.read().await.len() as i64)
    }
}
