mod common;

use actix_web::{web, App, HttpServer};
use chrono::NaiveDate;
use common::{jpeg_bytes, memory_state};
use photo_album::client::{Album, AlbumBackend, ApiClient, ClientError, SelectedFile, UploadFlow, UploadState};
use photo_album::handlers;
use photo_album::models::photo::PhotoUpdate;
use photo_album::state::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

async fn spawn_server(state: AppState) -> String {
    let state = web::Data::new(state);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(handlers::cors_headers())
            .configure(handlers::configure)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("failed to bind test server");
    let address = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", address)
}

fn fill_first_date(flow: &mut UploadFlow) {
    let form = flow.form_mut();
    form.title = "Our First Date".to_string();
    form.caption = "The day everything changed".to_string();
    form.date = NaiveDate::from_ymd_opt(2023, 2, 14).unwrap();
    form.location = "Central Park".to_string();
    form.tags.add("first-date").unwrap();
    form.tags.add("anniversary").unwrap();
}

#[actix_web::test]
async fn upload_flow_round_trips_through_the_server() {
    let base_url = spawn_server(memory_state("client_upload", None).await).await;
    let client = ApiClient::new(&base_url).unwrap();
    let mut album = Album::load(&client).await.unwrap();
    assert!(album.photos().is_empty());

    let bytes = jpeg_bytes(2 * 1024 * 1024);
    let mut flow = UploadFlow::new();
    flow.select_file(SelectedFile::new("first-date.jpg", "image/jpeg", bytes.clone()))
        .unwrap();
    fill_first_date(&mut flow);
    assert_eq!(flow.state(), UploadState::FormFilled);

    let mut progress = flow.subscribe_progress();
    let completed = actix_web::rt::spawn(async move {
        while progress.changed().await.is_ok() {
            if *progress.borrow_and_update() == 100 {
                return true;
            }
        }
        false
    });

    let photo = flow.submit(&client, &mut album).await.unwrap();
    assert!(completed.await.unwrap());
    assert_eq!(flow.state(), UploadState::Idle);
    assert_eq!(flow.progress(), 0);
    assert_eq!(photo.file_size, bytes.len() as i64);
    assert_eq!(photo.tags, vec!["first-date", "anniversary"]);
    assert_eq!(album.photos()[0].id, photo.id);

    let fetched = client.get_photo(photo.id).await.unwrap();
    assert_eq!(fetched, photo);

    assert_eq!(
        client.photo_file_url(photo.id),
        format!("{}/api/photos/{}/file", base_url, photo.id)
    );
    let downloaded = client.fetch_photo_file(photo.id).await.unwrap();
    assert_eq!(downloaded.len(), bytes.len());

    let reloaded = Album::load(&client).await.unwrap();
    assert_eq!(reloaded.photos().len(), 1);
    assert_eq!(reloaded.photos()[0].title, "Our First Date");
}

#[actix_web::test]
async fn photo_edit_and_delete_through_the_album() {
    let base_url = spawn_server(memory_state("client_edit", None).await).await;
    let client = ApiClient::new(&base_url).unwrap();
    let mut album = Album::new();

    let mut flow = UploadFlow::new();
    flow.select_file(SelectedFile::new("photo.png", "image/png", jpeg_bytes(4096)))
        .unwrap();
    fill_first_date(&mut flow);
    let photo = flow.submit(&client, &mut album).await.unwrap();
    assert_eq!(photo.mime_type, "image/jpeg");

    let update = PhotoUpdate {
        caption: Some("Coffee, then dinner, then forever".to_string()),
        ..Default::default()
    };
    let updated = album.update_photo(&client, photo.id, &update).await.unwrap();
    assert_eq!(updated.caption, "Coffee, then dinner, then forever");
    assert_eq!(album.photo(photo.id).unwrap().caption, updated.caption);

    let ack = client.delete_photo_with_ack(photo.id).await.unwrap();
    assert!(ack.file_deleted);

    let err = album.delete_photo(&client, photo.id).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Photo not found");
    assert_eq!(album.photos().len(), 1);
}

#[actix_web::test]
async fn server_rejection_keeps_the_form() {
    let base_url = spawn_server(memory_state("client_reject", None).await).await;
    let client = ApiClient::new(&base_url).unwrap();
    let mut album = Album::new();

    let mut flow = UploadFlow::new();
    flow.select_file(SelectedFile::new("fake.jpg", "image/jpeg", b"plain text pretending".to_vec()))
        .unwrap();
    fill_first_date(&mut flow);

    let err = flow.submit(&client, &mut album).await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 415, .. }));
    assert_eq!(flow.state(), UploadState::FormFilled);
    assert_eq!(flow.progress(), 0);
    assert!(flow.last_error().is_some());
    assert_eq!(flow.form().title, "Our First Date");
    assert!(album.photos().is_empty());
}

#[actix_web::test]
async fn messages_through_the_album() {
    let base_url = spawn_server(memory_state("client_messages", None).await).await;
    let client = ApiClient::new(&base_url).unwrap();
    let mut album = Album::load(&client).await.unwrap();

    let created = album
        .create_message(&client, "Happy Birthday, My Love!", "Another year of adventures")
        .await
        .unwrap();
    assert_eq!(album.messages()[0].id, created.id);

    let fetched = client.get_message(created.id).await.unwrap();
    assert_eq!(fetched, created);

    album.delete_message(&client, created.id).await.unwrap();
    assert!(album.messages().is_empty());

    let err = client.delete_message(created.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[actix_web::test]
async fn token_is_sent_as_bearer() {
    let state = memory_state("client_token", Some("s3cret")).await;
    let base_url = spawn_server(state).await;
    let token = photo_album::utils::jwt::generate_token("album-owner", "s3cret").unwrap();

    let anonymous = ApiClient::new(&base_url).unwrap();
    let mut album = Album::new();
    let err = album
        .create_message(&anonymous, "Hello", "World")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 401, .. }));

    let owner = ApiClient::new(&base_url).unwrap().with_token(token);
    album.create_message(&owner, "Hello", "World").await.unwrap();
    assert_eq!(owner.list_messages().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn timeout_fails_once_without_retry() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    actix_web::rt::spawn(async move {
        // Accept and hold connections without ever answering.
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });

    let client = ApiClient::new(&format!("http://{}", address))
        .unwrap()
        .with_timeouts(Duration::from_millis(50), Duration::from_millis(50));

    let err = client.list_photos().await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}
