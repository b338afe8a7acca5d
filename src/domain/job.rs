use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{CanonicalUrl, JobStatus, Transcript};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

/// A transcription job. Mutated only through the transition methods below,
/// which enforce the state machine: queued -> processing -> completed|failed,
/// with cancellation allowed from any non-terminal state.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub source_url: String,
    pub canonical_url: CanonicalUrl,
    pub status: JobStatus,
    pub progress: u8,
    pub current_step: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_processing_secs: u32,
    pub transcript: Option<Transcript>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub billed_tokens: u64,
}

impl Job {
    pub fn new(source_url: String, canonical_url: CanonicalUrl, estimated_processing_secs: u32) -> Self {
        Self {
            id: JobId::new(),
            source_url,
            canonical_url,
            status: JobStatus::Queued,
            progress: 0,
            current_step: None,
            submitted_at: Utc::now(),
            completed_at: None,
            estimated_processing_secs,
            transcript: None,
            error_code: None,
            error_message: None,
            billed_tokens: 0,
        }
    }

    /// Synthesize an already-completed job from a cached transcript. Billing
    /// is zero: the transcript was paid for by the original computation.
    pub fn completed_from_cache(
        source_url: String,
        canonical_url: CanonicalUrl,
        transcript: Transcript,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            source_url,
            canonical_url,
            status: JobStatus::Completed,
            progress: 100,
            current_step: None,
            submitted_at: now,
            completed_at: Some(now),
            estimated_processing_secs: 0,
            transcript: Some(transcript),
            error_code: None,
            error_message: None,
            billed_tokens: 0,
        }
    }

    pub fn begin_processing(&mut self) -> Result<(), TransitionError> {
        match self.status {
            JobStatus::Queued => {
                self.status = JobStatus::Processing;
                Ok(())
            }
            other => Err(TransitionError::refused(other, JobStatus::Processing)),
        }
    }

    pub fn complete(&mut self, transcript: Transcript, billed_tokens: u64) -> Result<(), TransitionError> {
        match self.status {
            JobStatus::Processing => {
                self.status = JobStatus::Completed;
                self.progress = 100;
                self.current_step = None;
                self.completed_at = Some(Utc::now());
                self.transcript = Some(transcript);
                self.billed_tokens = billed_tokens;
                Ok(())
            }
            other => Err(TransitionError::refused(other, JobStatus::Completed)),
        }
    }

    pub fn fail(&mut self, code: &str, message: &str) -> Result<(), TransitionError> {
        match self.status {
            JobStatus::Queued | JobStatus::Processing => {
                self.status = JobStatus::Failed;
                self.completed_at = Some(Utc::now());
                self.error_code = Some(code.to_string());
                self.error_message = Some(message.to_string());
                Ok(())
            }
            other => Err(TransitionError::refused(other, JobStatus::Failed)),
        }
    }

    /// Returns true when the job actually moved to cancelled. Cancelling a
    /// terminal job is a no-op, not an error.
    pub fn cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Cancelled;
        self.completed_at = Some(Utc::now());
        true
    }

    /// Worker progress callbacks. Out-of-order updates that would decrease
    /// progress are ignored, as are updates against non-processing jobs.
    pub fn record_progress(&mut self, progress: u8, step: Option<&str>) {
        if self.status != JobStatus::Processing {
            return;
        }
        let progress = progress.min(100);
        if progress < self.progress {
            return;
        }
        self.progress = progress;
        if let Some(step) = step {
            self.current_step = Some(step.to_string());
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("transition to {to} refused from {from}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

impl TransitionError {
    fn refused(from: JobStatus, to: JobStatus) -> Self {
        Self { from, to }
    }
}
