//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables with the `PORTAL_` prefix, `__` separating sections
//!    (`PORTAL_DATABASE__HOST`)
//! 2. Deployment environment variables (`GRPC_PORT`, `DB_HOST`, `JWT_KEY`, ...)
//! 3. `./config.toml`, or the file passed to [`Config::load_from`]
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Port the gRPC server listens on
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,

    /// Port the HTTP gateway listens on
    #[serde(default = "default_gateway_port")]
    pub gateway_port: u16,

    /// Address the gateway dials to reach the gRPC server
    #[serde(default = "default_grpc_server")]
    pub grpc_server: String,

    /// Upper bound on graceful shutdown, in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Gateway request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,
}

impl ServiceConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            grpc_port: default_grpc_port(),
            gateway_port: default_gateway_port(),
            grpc_server: default_grpc_server(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
            environment: Environment::default(),
        }
    }
}

/// Deployment environment
///
/// Unknown values fall back to `local`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Environment {
    #[default]
    Local,
    Dev,
    Stg,
    Prod,
}

impl Environment {
    /// Whether error causes may be shown to API clients
    pub fn exposes_error_details(&self) -> bool {
        matches!(self, Self::Local | Self::Dev)
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" => Self::Dev,
            "stg" => Self::Stg,
            "prod" => Self::Prod,
            _ => Self::Local,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual parts
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default = "default_db_user")]
    pub password: String,

    #[serde(default = "default_db_user")]
    pub name: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum idle connections
    #[serde(default)]
    pub min_connections: u32,

    /// Connections older than this are closed, in seconds
    #[serde(default = "default_connection_lifetime")]
    pub max_lifetime_secs: u64,

    /// Idle connections are closed after this long, in seconds
    #[serde(default = "default_connection_lifetime")]
    pub idle_timeout_secs: u64,

    /// How long to wait for a pooled connection, in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Maximum retry attempts for establishing the pool
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retry attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: default_db_user(),
            name: default_db_user(),
            max_connections: default_max_connections(),
            min_connections: 0,
            max_lifetime_secs: default_connection_lifetime(),
            idle_timeout_secs: default_connection_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing key
    #[serde(default)]
    pub secret: String,

    /// Lifetime of issued tokens, in seconds
    #[serde(default = "default_jwt_ttl")]
    pub ttl_secs: u64,
}

impl JwtConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_secs: default_jwt_ttl(),
        }
    }
}

fn default_service_name() -> String {
    "portal-service".to_string()
}

fn default_grpc_port() -> u16 {
    50051
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_grpc_server() -> String {
    "http://127.0.0.1:50051".to_string()
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_connection_lifetime() -> u64 {
    1800
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1
}

fn default_jwt_ttl() -> u64 {
    7 * 24 * 60 * 60
}

/// Nested key for a deployment environment variable
fn legacy_key(name: &str) -> Option<&'static str> {
    let key = match name {
        "GRPC_PORT" => "service.grpc_port",
        "GATEWAY_PORT" => "service.gateway_port",
        "GRPC_SERVER" => "service.grpc_server",
        "SHUTDOWN_TIMEOUT" => "service.shutdown_timeout_secs",
        "LOG_LEVEL" => "service.log_level",
        "ENV" => "service.environment",
        "DB_HOST" => "database.host",
        "DB_PORT" => "database.port",
        "DB_USER" => "database.user",
        "DB_PASS" => "database.password",
        "DB_NAME" => "database.name",
        "DB_MAX_OPEN_CONNS" => "database.max_connections",
        "DB_MAX_IDLE_CONNS" => "database.min_connections",
        "DB_CONN_MAX_LIFETIME" => "database.max_lifetime_secs",
        "DB_CONN_MAX_IDLE_TIME" => "database.idle_timeout_secs",
        "JWT_KEY" => "jwt.secret",
        _ => return None,
    };
    Some(key)
}

impl Config {
    /// Load configuration from `./config.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file and the environment
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
        }

        let config = Self::file_figment(path)
            .merge(Env::raw().filter_map(|key| {
                legacy_key(&key.as_str().to_ascii_uppercase()).map(Into::into)
            }))
            .merge(Env::prefixed("PORTAL_").split("__"))
            .extract()?;
        Ok(config)
    }

    /// Defaults overlaid with the TOML file
    fn file_figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
    }
}
