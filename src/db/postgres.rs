use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{MessageRepository, PhotoRepository};
use crate::errors::AppError;
use crate::models::message::{Message, MessageUpdate};
use crate::models::photo::{Photo, PhotoChanges};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl PhotoRepository for PgStore {
    async fn list_photos(&self) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>("SELECT * FROM photos ORDER BY date ASC, created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(photos)
    }

    async fn find_photo(&self, id: Uuid) -> Result<Option<Photo>, AppError> {
        let photo = sqlx::query_as::<_, Photo>("SELECT * FROM photos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(photo)
    }

    async fn insert_photo(&self, photo: &Photo) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO photos (id, title, caption, memory_note, date, location, tags, original_filename, file_size, mime_type, storage_key, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(photo.id)
        .bind(&photo.title)
        .bind(&photo.caption)
        .bind(&photo.memory_note)
        .bind(photo.date)
        .bind(&photo.location)
        .bind(&photo.tags)
        .bind(&photo.original_filename)
        .bind(photo.file_size)
        .bind(&photo.mime_type)
        .bind(&photo.storage_key)
        .bind(photo.created_at)
        .bind(photo.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_photo(&self, id: Uuid, changes: &PhotoChanges) -> Result<Option<Photo>, AppError> {
        let mut query: sqlx::QueryBuilder<'_, sqlx::Postgres> = sqlx::QueryBuilder::new("UPDATE photos SET ");
        let mut separated = query.separated(", ");

        if let Some(title) = &changes.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }
        if let Some(caption) = &changes.caption {
            separated.push("caption = ");
            separated.push_bind_unseparated(caption);
        }
        if let Some(memory_note) = &changes.memory_note {
            separated.push("memory_note = ");
            separated.push_bind_unseparated(memory_note);
        }
        if let Some(date) = changes.date {
            separated.push("date = ");
            separated.push_bind_unseparated(date);
        }
        if let Some(location) = &changes.location {
            separated.push("location = ");
            separated.push_bind_unseparated(location);
        }
        if let Some(tags) = &changes.tags {
            separated.push("tags = ");
            separated.push_bind_unseparated(tags);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING *");

        let photo = query
            .build_query_as::<Photo>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(photo)
    }

    async fn delete_photo(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MessageRepository for PgStore {
    async fn list_messages(&self) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>("SELECT * FROM messages ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(messages)
    }

    async fn find_message(&self, id: Uuid) -> Result<Option<Message>, AppError> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(message)
    }

    async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO messages (id, title, message, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(message.id)
        .bind(&message.title)
        .bind(&message.message)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_message(&self, id: Uuid, update: &MessageUpdate) -> Result<Option<Message>, AppError> {
        let mut query: sqlx::QueryBuilder<'_, sqlx::Postgres> = sqlx::QueryBuilder::new("UPDATE messages SET ");
        let mut separated = query.separated(", ");

        if let Some(title) = &update.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title.trim().to_string());
        }
        if let Some(body) = &update.message {
            separated.push("message = ");
            separated.push_bind_unseparated(body.trim().to_string());
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING *");

        let message = query
            .build_query_as::<Message>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(message)
    }

    async fn delete_message(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_messages(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
