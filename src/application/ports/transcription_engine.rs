use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{CanonicalUrl, Transcript};

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub progress: u8,
    pub step: String,
}

/// Channel an engine reports progress through while a job is running.
pub type ProgressSink = mpsc::Sender<ProgressUpdate>;

/// External worker collaborator. The scheduler never awaits this inline;
/// only the transcription runner drives it.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(
        &self,
        url: &CanonicalUrl,
        progress: ProgressSink,
    ) -> Result<Transcript, EngineError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("worker timed out: {0}")]
    Timeout(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("malformed worker response: {0}")]
    InvalidResponse(String),
}
