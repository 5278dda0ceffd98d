use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{NaiveDate, Utc};
use futures_util::TryStreamExt;
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

use super::parse_id;
use crate::errors::AppError;
use crate::models::photo::{normalize_tags, parse_photo_date, NewPhoto, Photo, PhotoChanges, PhotoUpdate};
use crate::state::AppState;
use crate::storage::blob_key;
use crate::utils::validation::{check_image, sniff_image, validate_payload, MAX_UPLOAD_BYTES};

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Raw parts of a `multipart/form-data` upload.
struct UploadParts {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

struct UploadedFile {
    original_filename: String,
    bytes: Vec<u8>,
}

async fn read_upload(mut payload: Multipart) -> Result<UploadParts, AppError> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|err| AppError::BadRequest(format!("Invalid multipart payload: {}", err)))?
    {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let filename = disposition.get_filename().map(str::to_string);

        let limit = if name == "file" { MAX_UPLOAD_BYTES } else { MAX_TEXT_FIELD_BYTES };
        let mut data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|err| AppError::BadRequest(format!("Invalid multipart payload: {}", err)))?
        {
            if data.len() + chunk.len() > limit {
                return Err(if name == "file" {
                    AppError::PayloadTooLarge("File too large. Maximum size is 10MB.".to_string())
                } else {
                    AppError::BadRequest(format!("Field {} is too large", name))
                });
            }
            data.extend_from_slice(&chunk);
        }

        if name == "file" {
            file = Some(UploadedFile {
                original_filename: filename.unwrap_or_else(|| "upload".to_string()),
                bytes: data,
            });
        } else if !name.is_empty() {
            let value = String::from_utf8(data)
                .map_err(|_| AppError::BadRequest(format!("Field {} is not valid UTF-8", name)))?;
            fields.insert(name, value);
        }
    }

    Ok(UploadParts { fields, file })
}

fn required_field(fields: &mut HashMap<String, String>, name: &str) -> Result<String, AppError> {
    fields
        .remove(name)
        .ok_or_else(|| AppError::BadRequest(format!("Field required: {}", name)))
}

fn parse_date_field(raw: &str) -> Result<NaiveDate, AppError> {
    parse_photo_date(raw).ok_or_else(|| AppError::BadRequest(format!("Invalid data format: date {}", raw)))
}

fn parse_tags_field(raw: Option<String>) -> Result<Vec<String>, AppError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(raw) => serde_json::from_str::<Vec<String>>(raw)
            .map(normalize_tags)
            .map_err(|_| AppError::BadRequest("Invalid data format: tags must be a JSON array of strings".to_string())),
    }
}

pub async fn list_photos(state: web::Data<AppState>) -> Result<HttpResponse, actix_web::Error> {
    let photos = state.photos.list_photos().await?;
    Ok(HttpResponse::Ok().json(photos))
}

pub async fn get_photo(
    state: web::Data<AppState>,
    photo_id: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let photo_id = parse_id(&photo_id.into_inner(), "photo")?;

    let photo = state
        .photos
        .find_photo(photo_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;

    Ok(HttpResponse::Ok().json(photo))
}

pub async fn create_photo(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, actix_web::Error> {
    state.authorize(&req)?;

    let UploadParts { mut fields, file } = read_upload(payload).await?;
    let file = file.ok_or_else(|| AppError::BadRequest("Field required: file".to_string()))?;

    let kind = sniff_image(&file.bytes);
    let mime_type = kind.as_ref().map(|kind| kind.mime_type()).unwrap_or("application/octet-stream");
    check_image(mime_type, file.bytes.len()).map_err(AppError::from)?;
    let extension = kind.as_ref().map(|kind| kind.extension()).unwrap_or("bin");

    let new_photo = NewPhoto {
        title: required_field(&mut fields, "title")?.trim().to_string(),
        caption: required_field(&mut fields, "caption")?.trim().to_string(),
        memory_note: fields.remove("memory_note").unwrap_or_default().trim().to_string(),
        date: parse_date_field(&required_field(&mut fields, "date")?)?,
        location: fields.remove("location").unwrap_or_default().trim().to_string(),
        tags: parse_tags_field(fields.remove("tags"))?,
    };
    validate_payload(&new_photo)?;

    let id = Uuid::new_v4();
    let storage_key = blob_key(new_photo.date, id, extension);
    state.blobs.put(&storage_key, &file.bytes, mime_type).await?;

    let now = Utc::now();
    let photo = Photo {
        id,
        title: new_photo.title,
        caption: new_photo.caption,
        memory_note: new_photo.memory_note,
        date: new_photo.date,
        location: new_photo.location,
        tags: new_photo.tags,
        original_filename: file.original_filename,
        file_size: file.bytes.len() as i64,
        mime_type: mime_type.to_string(),
        storage_key,
        created_at: now,
        updated_at: now,
    };

    if let Err(err) = state.photos.insert_photo(&photo).await {
        if let Err(cleanup) = state.blobs.delete(&photo.storage_key).await {
            log::warn!("Failed to remove orphaned blob {}: {}", photo.storage_key, cleanup);
        }
        return Err(err.into());
    }

    log::info!("Stored photo {} ({} bytes, {})", photo.id, photo.file_size, photo.mime_type);
    Ok(HttpResponse::Created().json(photo))
}

pub async fn update_photo(
    req: HttpRequest,
    state: web::Data<AppState>,
    photo_id: web::Path<String>,
    updates: web::Json<PhotoUpdate>,
) -> Result<HttpResponse, actix_web::Error> {
    state.authorize(&req)?;

    let mut updates = updates.into_inner();
    updates.tags = updates.tags.map(normalize_tags);
    validate_payload(&updates)?;

    let photo_id = parse_id(&photo_id.into_inner(), "photo")?;

    if updates.is_empty() {
        let photo = state
            .photos
            .find_photo(photo_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;
        return Ok(HttpResponse::Ok().json(photo));
    }

    let changes = PhotoChanges {
        title: updates.title.map(|title| title.trim().to_string()),
        caption: updates.caption.map(|caption| caption.trim().to_string()),
        memory_note: updates.memory_note.map(|note| note.trim().to_string()),
        date: updates.date.as_deref().map(parse_date_field).transpose()?,
        location: updates.location.map(|location| location.trim().to_string()),
        tags: updates.tags,
    };

    let photo = state
        .photos
        .update_photo(photo_id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;

    Ok(HttpResponse::Ok().json(photo))
}

pub async fn delete_photo(
    req: HttpRequest,
    state: web::Data<AppState>,
    photo_id: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    state.authorize(&req)?;
    let photo_id = parse_id(&photo_id.into_inner(), "photo")?;

    let photo = state
        .photos
        .find_photo(photo_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;

    // A record must never outlive its blob.
    if !state.photos.delete_photo(photo_id).await? {
        return Err(AppError::NotFound("Photo not found".to_string()).into());
    }

    let file_deleted = match state.blobs.delete(&photo.storage_key).await {
        Ok(deleted) => deleted,
        Err(err) => {
            log::warn!("Failed to delete blob for photo {}: {}", photo.id, err);
            false
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": "Photo deleted successfully",
        "file_deleted": file_deleted,
    })))
}

pub async fn get_photo_file(
    state: web::Data<AppState>,
    photo_id: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let photo_id = parse_id(&photo_id.into_inner(), "photo")?;

    let photo = state
        .photos
        .find_photo(photo_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;

    let bytes = state
        .blobs
        .get(&photo.storage_key)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo file not found".to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type(photo.mime_type.as_str())
        .insert_header(("Cache-Control", "public, max-age=31536000"))
        .insert_header(("ETag", format!("\"{}\"", photo.id)))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(photo.original_filename.clone())],
        })
        .body(bytes))
}
