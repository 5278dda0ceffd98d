use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{info, warn};
use std::fmt::Display;
use std::io::{Error, ErrorKind};
use std::sync::Arc;

use photo_album::config::{AppConfig, StorageBackend};
use photo_album::db::{self, PgStore};
use photo_album::handlers;
use photo_album::state::AppState;
use photo_album::storage::{s3, BlobStore, LocalBlobStore, S3BlobStore};
use photo_album::utils::jwt;

fn to_io(err: impl Display) -> Error {
    Error::other(err.to_string())
}

async fn build_state(config: &AppConfig) -> std::io::Result<AppState> {
    let blobs: Arc<dyn BlobStore> = match &config.storage {
        StorageBackend::Local { upload_dir } => {
            info!("Storing photos under {}", upload_dir.display());
            Arc::new(LocalBlobStore::new(upload_dir).await.map_err(to_io)?)
        }
        StorageBackend::S3 { bucket, region } => {
            info!("Storing photos in S3 bucket {}", bucket);
            Arc::new(S3BlobStore::new(s3::create_s3_client(region.clone()).await, bucket.clone()))
        }
    };

    let state = match &config.database_url {
        Some(database_url) => {
            let pool = db::create_pool(database_url).await.map_err(to_io)?;
            let store = Arc::new(PgStore::new(pool));
            AppState {
                photos: store.clone(),
                messages: store,
                blobs,
                jwt_secret: config.jwt_secret.clone(),
            }
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store; data is lost on restart");
            AppState::in_memory(blobs, config.jwt_secret.clone())
        }
    };
    Ok(state)
}

async fn serve(config: AppConfig) -> std::io::Result<()> {
    let state = web::Data::new(build_state(&config).await?);
    if config.jwt_secret.is_none() {
        warn!("JWT_SECRET not set, write endpoints accept unauthenticated requests");
    }

    info!("Starting server at {}", config.bind_address);

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(handlers::cors_headers())
            .configure(handlers::configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}

async fn seed(config: AppConfig) -> std::io::Result<()> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| to_io("DATABASE_URL must be set to seed messages"))?;
    let pool = db::create_pool(database_url).await.map_err(to_io)?;
    let store = PgStore::new(pool);

    let created = db::seed::seed_birthday_messages(&store).await.map_err(to_io)?;
    info!("Seeded {} birthday messages", created);
    Ok(())
}

fn issue_token(config: &AppConfig, subject: Option<&String>) -> std::io::Result<()> {
    let secret = config
        .jwt_secret
        .as_deref()
        .ok_or_else(|| to_io("JWT_SECRET must be set to issue tokens"))?;
    let subject = subject.map(String::as_str).unwrap_or("album-owner");
    let token = jwt::generate_token(subject, secret).map_err(to_io)?;
    println!("{}", token);
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    // Fail fast on a bad STORAGE_BACKEND or a missing bucket
    let config = AppConfig::from_env().map_err(to_io)?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("serve") => serve(config).await,
        Some("seed") => seed(config).await,
        Some("issue-token") => issue_token(&config, args.get(1)),
        Some(other) => Err(Error::new(
            ErrorKind::InvalidInput,
            format!("unknown command {:?}; expected serve, seed or issue-token", other),
        )),
    }
}
