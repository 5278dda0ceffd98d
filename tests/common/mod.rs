#![allow(dead_code)]

use photo_album::state::AppState;
use photo_album::storage::LocalBlobStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const BOUNDARY: &str = "album-boundary-7f3a";

/// Builds the album app with CORS headers around the `/api` routes.
macro_rules! album_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap(photo_album::handlers::cors_headers())
                .configure(photo_album::handlers::configure),
        )
        .await
    };
}

pub fn unique_temp_dir(label: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "photo_album_{}_{}_{}",
        label,
        std::process::id(),
        suffix
    ))
}

pub async fn memory_state(label: &str, jwt_secret: Option<&str>) -> AppState {
    let blobs = LocalBlobStore::new(unique_temp_dir(label))
        .await
        .expect("failed to create blob store");
    AppState::in_memory(Arc::new(blobs), jwt_secret.map(str::to_string))
}

/// JPEG magic followed by filler, `len` bytes in total.
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(len, 0x42);
    bytes
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn first_date_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("title", "Our First Date"),
        ("caption", "Coffee that turned into dinner"),
        ("memory_note", "You laughed at my terrible joke"),
        ("date", "2023-02-14"),
        ("location", "Central Park"),
        ("tags", r#"["first-date", "anniversary"]"#),
    ]
}
