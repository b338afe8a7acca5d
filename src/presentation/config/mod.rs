mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AuthSettings, CacheSettings, DatabaseSettings, LoggingSettings, RateLimitSettings,
    ServerSettings, Settings, StorageProvider, StorageSettings, WorkerProvider, WorkerSettings,
};
