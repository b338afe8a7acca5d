use std::collections::HashMap;

use config::{Config, File};
use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub rate_limit: RateLimitSettings,
    pub cache: CacheSettings,
    pub worker: WorkerSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layered configuration: `appsettings.{environment}.toml` overlaid with
    /// `APP_`-prefixed environment variables.
    pub fn load(environment: Environment) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(" "),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Shared secret for the `X-Engine-Auth` endpoint family.
    pub engine_secret: String,
    /// Allowed clock skew for signed requests, milliseconds.
    pub max_skew_ms: i64,
    /// API key -> signing secret for the signed endpoint family.
    pub credentials: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    pub capacity: u32,
    pub refill_per_sec: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub ttl_hours: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerProvider {
    Mock,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    pub provider: WorkerProvider,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub queue_capacity: usize,
    pub estimated_processing_secs: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProvider,
    pub database: Option<DatabaseSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}
