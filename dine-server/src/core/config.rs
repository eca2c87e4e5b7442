//! Server configuration
//!
//! Loaded once at start-up from environment variables (after `.env`).
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | required |
//! | `HTTP_PORT` | 8080 |
//! | `ENVIRONMENT` | development |
//! | `REQUEST_TIMEOUT_MS` | 30000 |
//! | `DB_MAX_CONNECTIONS` | 10 |
//! | `LOG_LEVEL` | info |
//! | `LOG_JSON` | true in production |
//! | `LOG_DIR` | unset (console only) |
//! | `JWT_SECRET` | required outside development |
//! | `JWT_EXPIRATION_MINUTES` | 1440 |
//! | `JWT_ISSUER` / `JWT_AUDIENCE` | dine-server / dine-clients |

use crate::auth::JwtConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port (API + WebSocket)
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Upper bound of the PostgreSQL pool
    pub db_max_connections: u32,
    pub log_level: String,
    pub log_json: bool,
    /// Directory for rolling log files
    pub log_dir: Option<String>,
    pub jwt: JwtConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: env_parse("HTTP_PORT", 8080),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30_000),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", is_production),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            jwt: JwtConfig::from_env(&environment)?,
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Parse an optional env var, falling back to `default` when unset or malformed
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
