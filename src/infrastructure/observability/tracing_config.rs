/// Configuration for tracing initialization.
///
/// `service_level` is the default verbosity for this crate's own targets;
/// `RUST_LOG` still overrides everything when set.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    pub service_level: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            service_level: "debug".to_string(),
        }
    }
}
