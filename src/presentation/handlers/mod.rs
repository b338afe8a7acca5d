mod cancel;
mod health;
mod jobs;
mod status;
mod transcribe;
mod version;

pub use cancel::cancel_handler;
pub use health::health_handler;
pub use jobs::{failed_jobs_handler, jobs_handler, queue_status_handler};
pub use status::status_handler;
pub use transcribe::{api_transcribe_handler, transcribe_handler};
pub use version::version_handler;
