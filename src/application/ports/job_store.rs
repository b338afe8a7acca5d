use async_trait::async_trait;

use crate::domain::{CanonicalUrl, Job, JobId, JobStatus, Transcript};

use super::StoreError;

/// Outcome of the atomic admit-or-dedup step on submission.
#[derive(Debug, Clone)]
pub enum Admission {
    /// The job was inserted; no equivalent work was in flight.
    Created(Job),
    /// A non-terminal job for the same canonical URL already exists.
    InFlight(Job),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusCounts {
    pub queued: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
}

/// Durable record of job identity, state, timestamps and result payload.
///
/// `insert_or_get_active` must be a single test-and-set: two concurrent
/// submissions of the same canonical URL get exactly one created job.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert_or_get_active(&self, job: Job) -> Result<Admission, StoreError>;

    /// Unconditional insert, used for cache-hit jobs that are born terminal.
    async fn insert(&self, job: Job) -> Result<(), StoreError>;

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError>;

    async fn begin_processing(&self, id: JobId) -> Result<Job, StoreError>;

    async fn complete(
        &self,
        id: JobId,
        transcript: Transcript,
        billed_tokens: u64,
    ) -> Result<Job, StoreError>;

    async fn fail(&self, id: JobId, code: &str, message: &str) -> Result<Job, StoreError>;

    /// Transitions a non-terminal job to cancelled; returns the job either
    /// way. Cancelling a terminal job leaves it untouched.
    async fn cancel(&self, id: JobId) -> Result<Job, StoreError>;

    async fn record_progress(
        &self,
        id: JobId,
        progress: u8,
        step: Option<&str>,
    ) -> Result<(), StoreError>;

    async fn find_active_by_url(&self, url: &CanonicalUrl) -> Result<Option<Job>, StoreError>;

    async fn list(&self) -> Result<Vec<Job>, StoreError>;

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, StoreError>;

    async fn counts(&self) -> Result<StatusCounts, StoreError>;
}
