pub mod memory;
pub mod postgres;
pub mod seed;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::message::{Message, MessageUpdate};
use crate::models::photo::{Photo, PhotoChanges};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// All photos, ascending by date.
    async fn list_photos(&self) -> Result<Vec<Photo>, AppError>;
    async fn find_photo(&self, id: Uuid) -> Result<Option<Photo>, AppError>;
    async fn insert_photo(&self, photo: &Photo) -> Result<(), AppError>;
    /// Returns `None` when no photo has this id.
    async fn update_photo(&self, id: Uuid, changes: &PhotoChanges) -> Result<Option<Photo>, AppError>;
    /// Returns `false` when no photo has this id.
    async fn delete_photo(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// All messages, newest first.
    async fn list_messages(&self) -> Result<Vec<Message>, AppError>;
    async fn find_message(&self, id: Uuid) -> Result<Option<Message>, AppError>;
    async fn insert_message(&self, message: &Message) -> Result<(), AppError>;
    async fn update_message(&self, id: Uuid, update: &MessageUpdate) -> Result<Option<Message>, AppError>;
    async fn delete_message(&self, id: Uuid) -> Result<bool, AppError>;
    async fn count_messages(&self) -> Result<i64, AppError>;
}

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    init_schema(&pool).await?;
    Ok(pool)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS photos (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        caption TEXT NOT NULL,
        memory_note TEXT NOT NULL DEFAULT '',
        date DATE NOT NULL,
        location TEXT NOT NULL DEFAULT '',
        tags TEXT[] NOT NULL DEFAULT '{}',
        original_filename TEXT NOT NULL,
        file_size BIGINT NOT NULL,
        mime_type TEXT NOT NULL,
        storage_key TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS photos_date_idx ON photos (date)",
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        message TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS messages_created_at_idx ON messages (created_at)",
];

async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    log::info!("Database schema initialized");
    Ok(())
}
