use crate::models::photo::{MAX_TAGS, MAX_TAG_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("tag is empty")]
    Blank,
    #[error("tag {0:?} is already added")]
    Duplicate(String),
    #[error("tag is longer than {} characters", MAX_TAG_LENGTH)]
    TooLong,
    #[error("a photo can have at most {} tags", MAX_TAGS)]
    TooMany,
}

/// Insertion-ordered tags with set semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the trimmed input; blanks and duplicates are rejected.
    pub fn add(&mut self, input: &str) -> Result<(), TagError> {
        let tag = input.trim();
        if tag.is_empty() {
            return Err(TagError::Blank);
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(TagError::TooLong);
        }
        if self.contains(tag) {
            return Err(TagError::Duplicate(tag.to_string()));
        }
        if self.tags.len() >= MAX_TAGS {
            return Err(TagError::TooMany);
        }
        self.tags.push(tag.to_string());
        Ok(())
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag);
        self.tags.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing == tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.tags.clone()
    }
}
