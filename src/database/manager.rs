use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::StorageConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds PostgreSQL connection pools from the storage configuration
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect a pool using `storage.database_url`
    pub async fn connect(storage: &StorageConfig) -> Result<PgPool, DatabaseError> {
        let raw = storage
            .database_url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let connection_string = Self::validate_url(raw)?;

        let pool = PgPoolOptions::new()
            .max_connections(storage.max_connections)
            .acquire_timeout(Duration::from_secs(storage.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!(
            "Created database pool for: {} (max {} connections)",
            Self::redacted(&connection_string),
            storage.max_connections
        );
        Ok(pool)
    }

    /// Accept only postgres:// or postgresql:// URLs that name a database
    fn validate_url(raw: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        if url.path().trim_start_matches('/').is_empty() {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        Ok(url.into())
    }

    /// Connection string with the password masked, for logs
    fn redacted(connection_string: &str) -> String {
        match url::Url::parse(connection_string) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.into()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
