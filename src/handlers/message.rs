use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde_json::json;

use super::parse_id;
use crate::errors::AppError;
use crate::models::message::{Message, MessageUpdate, NewMessage};
use crate::state::AppState;
use crate::utils::validation::validate_payload;

pub async fn list_messages(state: web::Data<AppState>) -> Result<HttpResponse, actix_web::Error> {
    let messages = state.messages.list_messages().await?;
    Ok(HttpResponse::Ok().json(messages))
}

pub async fn get_message(
    state: web::Data<AppState>,
    message_id: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let message_id = parse_id(&message_id.into_inner(), "message")?;

    let message = state
        .messages
        .find_message(message_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

    Ok(HttpResponse::Ok().json(message))
}

pub async fn create_message(
    req: HttpRequest,
    state: web::Data<AppState>,
    new_message: web::Json<NewMessage>,
) -> Result<HttpResponse, actix_web::Error> {
    state.authorize(&req)?;
    validate_payload(&new_message.0)?;

    let message = Message::new(&new_message.title, &new_message.message, Utc::now());
    state.messages.insert_message(&message).await?;

    Ok(HttpResponse::Created().json(message))
}

pub async fn update_message(
    req: HttpRequest,
    state: web::Data<AppState>,
    message_id: web::Path<String>,
    updates: web::Json<MessageUpdate>,
) -> Result<HttpResponse, actix_web::Error> {
    state.authorize(&req)?;
    validate_payload(&updates.0)?;

    let message_id = parse_id(&message_id.into_inner(), "message")?;

    let message = if updates.title.is_none() && updates.message.is_none() {
        state.messages.find_message(message_id).await?
    } else {
        state.messages.update_message(message_id, &updates).await?
    }
    .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

    Ok(HttpResponse::Ok().json(message))
}

pub async fn delete_message(
    req: HttpRequest,
    state: web::Data<AppState>,
    message_id: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    state.authorize(&req)?;
    let message_id = parse_id(&message_id.into_inner(), "message")?;

    if !state.messages.delete_message(message_id).await? {
        return Err(AppError::NotFound("Message not found".to_string()).into());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Birthday message deleted successfully",
    })))
}
