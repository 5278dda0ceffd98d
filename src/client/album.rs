use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

use super::{AlbumBackend, ClientError};
use crate::models::message::{Message, MessageUpdate, NewMessage};
use crate::models::photo::{Photo, PhotoUpdate};

/// The client's copy of the album, fetched once and then kept in step with
/// confirmed writes.
#[derive(Debug, Default, Clone)]
pub struct Album {
    photos: Vec<Photo>,
    messages: Vec<Message>,
    favorites: HashSet<Uuid>,
}

impl Album {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(photos: Vec<Photo>, messages: Vec<Message>) -> Self {
        Album {
            photos,
            messages,
            favorites: HashSet::new(),
        }
    }

    pub async fn load<B: AlbumBackend + ?Sized>(backend: &B) -> Result<Self, ClientError> {
        let (photos, messages) = tokio::try_join!(backend.list_photos(), backend.list_messages())?;
        log::info!("Loaded {} photos and {} messages", photos.len(), messages.len());
        Ok(Self::from_parts(photos, messages))
    }

    /// Gallery order.
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn photo(&self, id: Uuid) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.id == id)
    }

    /// Photos ascending by date; equal dates keep gallery order.
    pub fn timeline(&self) -> Vec<&Photo> {
        let mut photos: Vec<&Photo> = self.photos.iter().collect();
        photos.sort_by_key(|photo| photo.date);
        photos
    }

    /// Puts a server-confirmed photo at the front, exactly once.
    pub fn merge_photo(&mut self, photo: Photo) {
        self.photos.retain(|existing| existing.id != photo.id);
        self.photos.insert(0, photo);
    }

    pub fn merge_message(&mut self, message: Message) {
        self.messages.retain(|existing| existing.id != message.id);
        self.messages.insert(0, message);
    }

    fn replace_photo(&mut self, photo: Photo) {
        match self.photos.iter_mut().find(|existing| existing.id == photo.id) {
            Some(existing) => *existing = photo,
            None => self.photos.insert(0, photo),
        }
    }

    fn replace_message(&mut self, message: Message) {
        match self.messages.iter_mut().find(|existing| existing.id == message.id) {
            Some(existing) => *existing = message,
            None => self.messages.insert(0, message),
        }
    }

    fn remove_photo(&mut self, id: Uuid) {
        self.photos.retain(|photo| photo.id != id);
        self.favorites.remove(&id);
    }

    fn remove_message(&mut self, id: Uuid) {
        self.messages.retain(|message| message.id != id);
    }

    pub async fn create_message<B: AlbumBackend + ?Sized>(
        &mut self,
        backend: &B,
        title: &str,
        body: &str,
    ) -> Result<Message, ClientError> {
        let new_message = NewMessage {
            title: title.trim().to_string(),
            message: body.trim().to_string(),
        };
        if new_message.validate().is_err() {
            return Err(ClientError::Validation(
                "Please fill in both title and message fields".to_string(),
            ));
        }

        let message = backend.create_message(&new_message).await?;
        self.merge_message(message.clone());
        Ok(message)
    }

    pub async fn update_message<B: AlbumBackend + ?Sized>(
        &mut self,
        backend: &B,
        id: Uuid,
        update: &MessageUpdate,
    ) -> Result<Message, ClientError> {
        let message = backend.update_message(id, update).await?;
        self.replace_message(message.clone());
        Ok(message)
    }

    pub async fn delete_message<B: AlbumBackend + ?Sized>(&mut self, backend: &B, id: Uuid) -> Result<(), ClientError> {
        backend.delete_message(id).await?;
        self.remove_message(id);
        Ok(())
    }

    pub async fn update_photo<B: AlbumBackend + ?Sized>(
        &mut self,
        backend: &B,
        id: Uuid,
        update: &PhotoUpdate,
    ) -> Result<Photo, ClientError> {
        let photo = backend.update_photo(id, update).await?;
        self.replace_photo(photo.clone());
        Ok(photo)
    }

    pub async fn delete_photo<B: AlbumBackend + ?Sized>(&mut self, backend: &B, id: Uuid) -> Result<(), ClientError> {
        backend.delete_photo(id).await?;
        self.remove_photo(id);
        Ok(())
    }

    /// Returns whether the photo is a favorite afterwards.
    pub fn toggle_favorite(&mut self, id: Uuid) -> bool {
        if !self.favorites.remove(&id) {
            self.favorites.insert(id);
            return true;
        }
        false
    }

    pub fn is_favorite(&self, id: Uuid) -> bool {
        self.favorites.contains(&id)
    }
}
