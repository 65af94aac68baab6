//! Runtime configuration.
//!
//! Resolved once at startup from the environment and passed into the router,
//! so request handling never reads process-wide variables.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_DATABASE: &str = "database.sqlite";
pub const DEFAULT_LOG_LEVEL: &str = "debug";
pub const DEVELOPMENT: &str = "development";

/// In-memory database marker for `DB_DATABASE`.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be true or false, got {value:?}")]
    InvalidBool { key: &'static str, value: String },
    #[error("{key} is not a valid address: {value:?}")]
    InvalidAddress { key: &'static str, value: String },
    #[error("CORS_ORIGIN is not a valid header value: {0:?}")]
    InvalidOrigin(String),
}

/// Origins allowed by CORS. `*` in `CORS_ORIGIN` means any origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsOrigin {
    Any,
    Exact(HeaderValue),
}

impl CorsOrigin {
    fn parse(origin: String) -> Result<Self, ConfigError> {
        let trimmed = origin.trim();
        if trimmed == "*" {
            return Ok(CorsOrigin::Any);
        }
        match HeaderValue::from_str(trimmed) {
            Ok(value) => Ok(CorsOrigin::Exact(value)),
            Err(_) => Err(ConfigError::InvalidOrigin(origin)),
        }
    }
}

/// Where the SQLite data lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseLocation {
    InMemory,
    File(PathBuf),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub cors_origin: CorsOrigin,
    pub cors_credentials: bool,
    pub database: DatabaseLocation,
    pub log_level: String,
    pub environment: String,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = match get("HOST") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidAddress { key: "HOST", value })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let origin = get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into());
        let cors_origin = CorsOrigin::parse(origin)?;

        let cors_credentials = match get("CORS_CREDENTIALS") {
            Some(value) => parse_bool("CORS_CREDENTIALS", value)?,
            None => true,
        };

        let database = match get("DB_DATABASE") {
            Some(path) if path.trim() == IN_MEMORY => DatabaseLocation::InMemory,
            Some(path) => DatabaseLocation::File(PathBuf::from(path.trim())),
            None => DatabaseLocation::File(PathBuf::from(DEFAULT_DATABASE)),
        };

        Ok(Self {
            host,
            port,
            cors_origin,
            cors_credentials,
            database,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.into()),
            environment: get("APP_ENV").unwrap_or_else(|| DEVELOPMENT.into()),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Per-request logging is only switched on in development.
    pub fn request_logging(&self) -> bool {
        self.environment == DEVELOPMENT
    }

    /// CORS for the configured browser origin.
    ///
    /// Credentials cannot be combined with a wildcard origin; they are
    /// dropped with a warning in that case.
    pub fn cors_layer(&self) -> CorsLayer {
        let (origin, credentials) = match &self.cors_origin {
            CorsOrigin::Any => {
                if self.cors_credentials {
                    tracing::warn!(
                        "CORS_ORIGIN=* cannot allow credentials; serving without CORS credentials"
                    );
                }
                (AllowOrigin::any(), false)
            }
            CorsOrigin::Exact(value) => (AllowOrigin::exact(value.clone()), self.cors_credentials),
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(credentials)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool { key, value }),
    }
}
