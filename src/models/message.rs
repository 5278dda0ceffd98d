use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::photo::not_blank;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Validate, Debug, Clone, PartialEq)]
pub struct NewMessage {
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    pub title: String,
    #[validate(length(min = 1, max = 1000), custom = "not_blank")]
    pub message: String,
}

#[derive(Deserialize, Serialize, Validate, Debug, Default, Clone, PartialEq)]
pub struct MessageUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 1000), custom = "not_blank")]
    pub message: Option<String>,
}

impl Message {
    pub fn new(title: &str, body: &str, now: DateTime<Utc>) -> Self {
        Message {
            id: Uuid::new_v4(),
            title: title.trim().to_string(),
            message: body.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: &MessageUpdate, now: DateTime<Utc>) {
        if let Some(title) = &update.title {
            self.title = title.trim().to_string();
        }
        if let Some(body) = &update.message {
            self.message = body.trim().to_string();
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_body_limit_is_enforced() {
        let message = NewMessage {
            title: "Happy Birthday, My Love!".to_string(),
            message: "x".repeat(1001),
        };
        assert!(message.validate().is_err());
    }

    #[test]
    fn new_message_trims_input() {
        let message = Message::new("  To Many More Adventures ", " more laughter\n", Utc::now());
        assert_eq!(message.title, "To Many More Adventures");
        assert_eq!(message.message, "more laughter");
        assert_eq!(message.created_at, message.updated_at);
    }
}
