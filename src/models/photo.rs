use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_LENGTH: usize = 50;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: Uuid,
    pub title: String,
    pub caption: String,
    pub memory_note: String,
    pub date: NaiveDate,
    pub location: String,
    pub tags: Vec<String>,
    pub original_filename: String,
    pub file_size: i64,
    pub mime_type: String,
    /// Blob store key; never leaves the server.
    #[serde(skip)]
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata fields of an upload, after the multipart form has been read.
#[derive(Debug, Validate)]
pub struct NewPhoto {
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    pub title: String,
    #[validate(length(min = 1, max = 500), custom = "not_blank")]
    pub caption: String,
    #[validate(length(max = 2000))]
    pub memory_note: String,
    pub date: NaiveDate,
    #[validate(length(max = 200))]
    pub location: String,
    #[validate(length(max = 20), custom = "validate_tags")]
    pub tags: Vec<String>,
}

#[derive(Deserialize, Serialize, Validate, Debug, Default, Clone, PartialEq)]
pub struct PhotoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 500), custom = "not_blank")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub memory_note: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20), custom = "validate_tags")]
    pub tags: Option<Vec<String>>,
}

impl PhotoUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.caption.is_none()
            && self.memory_note.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.tags.is_none()
    }
}

/// A validated update with the date already parsed, ready for a repository.
#[derive(Debug, Default, Clone)]
pub struct PhotoChanges {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub memory_note: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl Photo {
    pub fn apply(&mut self, changes: &PhotoChanges, now: DateTime<Utc>) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(caption) = &changes.caption {
            self.caption = caption.clone();
        }
        if let Some(memory_note) = &changes.memory_note {
            self.memory_note = memory_note.clone();
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        if let Some(location) = &changes.location {
            self.location = location.clone();
        }
        if let Some(tags) = &changes.tags {
            self.tags = tags.clone();
        }
        self.updated_at = now;
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("must not be blank"));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), validator::ValidationError> {
    if tags.iter().any(|tag| tag.chars().count() > MAX_TAG_LENGTH) {
        return Err(validator::ValidationError::new("tag is longer than 50 characters"));
    }
    Ok(())
}

/// Parses a photo date sent as `YYYY-MM-DD` or as a full timestamp.
pub fn parse_photo_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|datetime| datetime.date())
}

/// Trims tags, drops blanks and keeps the first occurrence of each tag.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !normalized.iter().any(|existing| existing == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_timestamp_dates() {
        let expected = NaiveDate::from_ymd_opt(2023, 2, 14).unwrap();
        assert_eq!(parse_photo_date("2023-02-14"), Some(expected));
        assert_eq!(parse_photo_date("2023-02-14T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_photo_date("2023-02-14T18:30:00+02:00"), Some(expected));
        assert_eq!(parse_photo_date("2023-02-14T18:30:00"), Some(expected));
        assert_eq!(parse_photo_date("Valentine's day"), None);
    }

    #[test]
    fn normalize_tags_dedups_in_order() {
        let tags = normalize_tags([" beach ", "sunset", "", "beach", "sunset ", "dinner"]);
        assert_eq!(tags, vec!["beach", "sunset", "dinner"]);
    }

    #[test]
    fn blank_title_fails_validation() {
        let photo = NewPhoto {
            title: "   ".to_string(),
            caption: "The day everything changed".to_string(),
            memory_note: String::new(),
            date: NaiveDate::from_ymd_opt(2023, 2, 14).unwrap(),
            location: String::new(),
            tags: vec![],
        };
        assert!(photo.validate().is_err());
    }

    #[test]
    fn update_only_touches_given_fields() {
        let now = Utc::now();
        let mut photo = Photo {
            id: Uuid::new_v4(),
            title: "Our First Date".to_string(),
            caption: "The day everything changed".to_string(),
            memory_note: String::new(),
            date: NaiveDate::from_ymd_opt(2023, 2, 14).unwrap(),
            location: "Central Park".to_string(),
            tags: vec!["first-date".to_string()],
            original_filename: "date.jpg".to_string(),
            file_size: 10,
            mime_type: "image/jpeg".to_string(),
            storage_key: "2023/02/x.jpg".to_string(),
            created_at: now,
            updated_at: now,
        };
        let later = now + chrono::Duration::seconds(5);
        photo.apply(
            &PhotoChanges {
                location: Some("Paris".to_string()),
                ..Default::default()
            },
            later,
        );

        assert_eq!(photo.location, "Paris");
        assert_eq!(photo.title, "Our First Date");
        assert_eq!(photo.tags, vec!["first-date"]);
        assert_eq!(photo.updated_at, later);
    }
}
