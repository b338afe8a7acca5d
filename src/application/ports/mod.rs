mod fingerprint_cache;
mod job_store;
mod store_error;
mod transcription_engine;

pub use fingerprint_cache::FingerprintCache;
pub use job_store::{Admission, JobStore, StatusCounts};
pub use store_error::StoreError;
pub use transcription_engine::{EngineError, ProgressSink, ProgressUpdate, TranscriptionEngine};
