use validator::{Validate, ValidationErrors};

use crate::errors::AppError;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageRejection {
    #[error("Invalid file type {}. Allowed types: {}", .0, ALLOWED_MIME_TYPES.join(", "))]
    UnsupportedType(String),
    #[error("File too large. Maximum size is 10MB.")]
    TooLarge(usize),
}

impl From<ImageRejection> for AppError {
    fn from(rejection: ImageRejection) -> Self {
        match rejection {
            ImageRejection::UnsupportedType(_) => AppError::UnsupportedMediaType(rejection.to_string()),
            ImageRejection::TooLarge(_) => AppError::PayloadTooLarge(rejection.to_string()),
        }
    }
}

/// Type and size gate shared by the upload form and the upload handler.
pub fn check_image(mime_type: &str, size: usize) -> Result<(), ImageRejection> {
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(ImageRejection::UnsupportedType(mime_type.to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ImageRejection::TooLarge(size));
    }
    Ok(())
}

/// Sniffs the image type from its leading bytes.
pub fn sniff_image(bytes: &[u8]) -> Option<infer::Type> {
    infer::get(bytes).filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(format!("Validation failed: {}", describe(&err))))
}

fn describe(err: &ValidationErrors) -> String {
    let mut fields: Vec<String> = err
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let codes = errs
                .iter()
                .map(|e| e.code.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: [{}]", field, codes)
        })
        .collect();
    fields.sort();
    fields.join("; ")
}
