use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{Admission, JobStore, StatusCounts, StoreError};
use crate::domain::{CanonicalUrl, Job, JobId, JobStatus, Transcript};

#[derive(Default)]
struct Inner {
    jobs: HashMap<JobId, Job>,
    /// Non-terminal job per canonical URL; the dedup index.
    active_by_url: HashMap<CanonicalUrl, JobId>,
}

/// In-memory job store, the test and single-node backend.
///
/// One write lock covers both maps, which makes `insert_or_get_active` the
/// atomic test-and-set the scheduler relies on.
#[derive(Default)]
pub struct MemoryJobStore {
    inner: RwLock<Inner>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn release_if_terminal(&mut self, id: JobId) {
        if let Some(job) = self.jobs.get(&id) {
            if job.status.is_terminal() {
                if self.active_by_url.get(&job.canonical_url) == Some(&id) {
                    self.active_by_url.remove(&job.canonical_url);
                }
            }
        }
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert_or_get_active(&self, job: Job) -> Result<Admission, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(existing_id) = inner.active_by_url.get(&job.canonical_url).copied() {
            if let Some(existing) = inner.jobs.get(&existing_id) {
                if !existing.status.is_terminal() {
                    return Ok(Admission::InFlight(existing.clone()));
                }
            }
            // Stale index entry for a finished job.
            inner.active_by_url.remove(&job.canonical_url);
        }

        inner.active_by_url.insert(job.canonical_url.clone(), job.id);
        inner.jobs.insert(job.id, job.clone());
        Ok(Admission::Created(job))
    }

    async fn insert(&self, job: Job) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.jobs.insert(job.id, job);
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.jobs.get(&id).cloned())
    }

    async fn begin_processing(&self, id: JobId) -> Result<Job, StoreError> {
        let mut inner = self.inner.write().await;
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.as_uuid().to_string()))?;
        job.begin_processing()?;
        Ok(job.clone())
    }

    async fn complete(
        &self,
        id: JobId,
        transcript: Transcript,
        billed_tokens: u64,
    ) -> Result<Job, StoreError> {
        let mut inner = self.inner.write().await;
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.as_uuid().to_string()))?;
        job.complete(transcript, billed_tokens)?;
        let job = job.clone();
        inner.release_if_terminal(id);
        Ok(job)
    }

    async fn fail(&self, id: JobId, code: &str, message: &str) -> Result<Job, StoreError> {
        let mut inner = self.inner.write().await;
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.as_uuid().to_string()))?;
        job.fail(code, message)?;
        let job = job.clone();
        inner.release_if_terminal(id);
        Ok(job)
    }

    async fn cancel(&self, id: JobId) -> Result<Job, StoreError> {
        let mut inner = self.inner.write().await;
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.as_uuid().to_string()))?;
        job.cancel();
        let job = job.clone();
        inner.release_if_terminal(id);
        Ok(job)
    }

    async fn record_progress(
        &self,
        id: JobId,
        progress: u8,
        step: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.as_uuid().to_string()))?;
        job.record_progress(progress, step);
        Ok(())
    }

    async fn find_active_by_url(&self, url: &CanonicalUrl) -> Result<Option<Job>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .active_by_url
            .get(url)
            .and_then(|id| inner.jobs.get(id))
            .filter(|job| !job.status.is_terminal())
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let inner = self.inner.read().await;
        let mut jobs: Vec<Job> = inner.jobs.values().cloned().collect();
        jobs.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(jobs)
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, StoreError> {
        let inner = self.inner.read().await;
        let mut jobs: Vec<Job> = inner
            .jobs
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(jobs)
    }

    async fn counts(&self) -> Result<StatusCounts, StoreError> {
        let inner = self.inner.read().await;
        let mut counts = StatusCounts::default();
        for job in inner.jobs.values() {
            match job.status {
                JobStatus::Queued => counts.queued += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
                JobStatus::Cancelled => counts.cancelled += 1,
            }
        }
        Ok(counts)
    }
}
