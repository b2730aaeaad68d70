/// Configuration management for Like Service
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Minimum accepted length of the shared JWT secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token validation settings
    pub auth: AuthConfig,
    /// Reconciliation event settings
    pub events: EventsConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Which like store implementation to run against
    pub store_backend: StoreBackend,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// JWT validation configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

/// Reconciliation event broadcast configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Buffered events per subscriber before it starts lagging
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("unknown STORE_BACKEND: {}", other),
        }
    }
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_events_capacity() -> usize {
    256
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Postgres,
        };

        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            store_backend,
        };

        let database_url = match store_backend {
            StoreBackend::Postgres => std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            StoreBackend::Memory => std::env::var("DATABASE_URL").unwrap_or_default(),
        };

        let database = DatabaseConfig {
            url: database_url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_connections),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_min_connections),
        };

        let jwt_secret =
            std::env::var("JWT_SECRET").context("JWT_SECRET environment variable not set")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!(
                "JWT_SECRET too short: need at least {} bytes",
                MIN_JWT_SECRET_LEN
            );
        }

        let events = EventsConfig {
            channel_capacity: std::env::var("LIKE_EVENTS_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or_else(default_events_capacity),
        };

        Ok(Config {
            app,
            database,
            auth: AuthConfig { jwt_secret },
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global; keep every assertion in one test.
    #[test]
    fn test_from_env() {
        std::env::remove_var("STORE_BACKEND");
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("JWT_SECRET", "a".repeat(32));

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.http_port, 8080);
        assert_eq!(config.app.store_backend, StoreBackend::Postgres);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.min_connections, 5);
        assert_eq!(config.events.channel_capacity, 256);
        assert!(!format!("{:?}", config.auth).contains("aaaa"));

        std::env::set_var("JWT_SECRET", "short");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET too short"));

        std::env::set_var("JWT_SECRET", "a".repeat(32));
        std::env::set_var("STORE_BACKEND", "memory");
        std::env::remove_var("DATABASE_URL");
        let config = Config::from_env().unwrap();
        assert_eq!(config.app.store_backend, StoreBackend::Memory);

        std::env::set_var("STORE_BACKEND", "sqlite");
        assert!(Config::from_env().is_err());
        std::env::remove_var("STORE_BACKEND");
    }
}
