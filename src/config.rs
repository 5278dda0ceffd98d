use std::env;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Local { upload_dir: PathBuf },
    S3 { bucket: String, region: Option<String> },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub storage: StorageBackend,
    /// `None` leaves the API open.
    pub jwt_secret: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let storage = match var("STORAGE_BACKEND").as_deref().unwrap_or("local") {
            "local" => StorageBackend::Local {
                upload_dir: PathBuf::from(var("UPLOAD_DIR").unwrap_or_else(|| "./uploads".to_string())),
            },
            "s3" => StorageBackend::S3 {
                bucket: var("AWS_S3_BUCKET").ok_or(ConfigError::Missing("AWS_S3_BUCKET"))?,
                region: var("AWS_REGION"),
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        Ok(AppConfig {
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            database_url: var("DATABASE_URL"),
            storage,
            jwt_secret: var("JWT_SECRET"),
        })
    }
}
