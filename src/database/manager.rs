use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config;
use crate::config::DatabaseConfig;

/// Errors from the connection pool manager
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Process-wide connection pool for the platform database.
///
/// Each request checks a connection out of the pool for the duration of its
/// statements and returns it on every exit path by scope; nothing else is
/// shared across requests.
pub struct Database;

static POOL: OnceLock<PgPool> = OnceLock::new();

impl Database {
    /// Get the shared pool, creating it lazily on first use.
    ///
    /// Connections are established on demand, so this never blocks on the
    /// database itself.
    pub fn pool() -> Result<PgPool, DbError> {
        if let Some(pool) = POOL.get() {
            return Ok(pool.clone());
        }

        let cfg = &config::config().database;
        let options = connect_options(cfg)?;

        // Construction happens inside the closure, so concurrent first
        // callers agree on a single pool.
        let pool = POOL.get_or_init(|| {
            info!("created database pool ({} max connections)", cfg.max_connections);
            PgPoolOptions::new()
                .max_connections(cfg.max_connections)
                .acquire_timeout(Duration::from_secs(cfg.connection_timeout_secs))
                .connect_lazy_with(options)
        });
        Ok(pool.clone())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DbError> {
        let pool = Self::pool()?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }
}

/// Parse the configured URL into connection options, rejecting an empty or
/// malformed value before any pool exists.
fn connect_options(cfg: &DatabaseConfig) -> Result<PgConnectOptions, DbError> {
    if cfg.url.is_empty() {
        return Err(DbError::ConfigMissing("DATABASE_URL"));
    }
    cfg.url.parse().map_err(|_| DbError::InvalidDatabaseUrl)
}
