pub mod auth_guard;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::{Environment, Settings, StorageProvider, WorkerProvider};
pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
