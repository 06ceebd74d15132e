use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECRET_KEY is not set! Set it as an environment variable.")]
    SecretKeyMissing,
    #[error("DATABASE_URL is not set! Set it as an environment variable.")]
    DatabaseUrlMissing,
    #[error("DATABASE_URL is not a valid connection URL")]
    DatabaseUrlInvalid,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::defaults(environment).with_env_overrides()
    }

    fn defaults(environment: Environment) -> Self {
        let max_connections = match environment {
            Environment::Development => 10,
            Environment::Staging => 20,
            Environment::Production => 50,
        };

        Self {
            environment,
            database: DatabaseConfig {
                url: String::new(),
                max_connections,
                connection_timeout_secs: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                // Tokens issued at login are valid for two hours
                jwt_expiry_hours: 2,
                cors_origins: Vec::new(),
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                max_upload_bytes: 50 * 1024 * 1024,
            },
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("MAX_UPLOAD_BYTES") {
            self.storage.max_upload_bytes = v.parse().unwrap_or(self.storage.max_upload_bytes);
        }

        self
    }

    /// Required-at-startup validation. The signing secret and the database
    /// URL have no usable defaults; refuse to start without them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::SecretKeyMissing);
        }
        if self.database.url.is_empty() {
            return Err(ConfigError::DatabaseUrlMissing);
        }
        url::Url::parse(&self.database.url).map_err(|_| ConfigError::DatabaseUrlInvalid)?;
        Ok(())
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::defaults(Environment::Development);
        assert_eq!(config.security.jwt_expiry_hours, 2);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.storage.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn validate_rejects_missing_secret() {
        let config = AppConfig::defaults(Environment::Development);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SecretKeyMissing)
        ));
    }

    #[test]
    fn validate_rejects_malformed_database_url() {
        let mut config = AppConfig::defaults(Environment::Development);
        config.security.jwt_secret = "secret".to_string();
        config.database.url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DatabaseUrlInvalid)
        ));
    }

    #[test]
    fn validate_accepts_complete_config() {
        let mut config = AppConfig::defaults(Environment::Production);
        config.security.jwt_secret = "secret".to_string();
        config.database.url = "postgres://localhost/orbis".to_string();
        assert!(config.validate().is_ok());
    }
}
