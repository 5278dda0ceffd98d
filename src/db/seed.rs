use chrono::Utc;

use super::MessageRepository;
use crate::errors::AppError;
use crate::models::message::Message;

const BIRTHDAY_MESSAGES: &[(&str, &str)] = &[
    (
        "Happy Birthday, My Love!",
        "Another year of being blessed to have you in my life. You make every day brighter, every moment more meaningful. Here's to creating more beautiful memories together.",
    ),
    (
        "Our Journey So Far",
        "Every photo in this album tells a story of our love. From our first nervous glances to the comfortable silence we share now - each moment has been a gift.",
    ),
    (
        "To Many More Adventures",
        "This album is just the beginning. I can't wait to fill it with more laughter, more adventures, and more reasons to fall in love with you every single day.",
    ),
];

/// Inserts the default birthday messages into an empty message table.
/// Returns how many messages were created.
pub async fn seed_birthday_messages(repo: &dyn MessageRepository) -> Result<usize, AppError> {
    let existing = repo.count_messages().await?;
    if existing > 0 {
        log::info!("Database already has {} birthday messages, skipping seed", existing);
        return Ok(0);
    }

    let now = Utc::now();
    for (offset, (title, body)) in BIRTHDAY_MESSAGES.iter().enumerate() {
        // Later entries get later timestamps so newest-first listing keeps a stable order.
        let created_at = now + chrono::Duration::milliseconds(offset as i64);
        let message = Message::new(title, body, created_at);
        repo.insert_message(&message).await?;
        log::info!("Created message: {}", message.title);
    }

    Ok(BIRTHDAY_MESSAGES.len())
}
