use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::{Admission, FingerprintCache, JobStore, StoreError};
use crate::domain::{CanonicalUrl, Job, JobId, UrlError};

use super::CancellationRegistry;

/// Handoff unit between admission and the transcription runner.
#[derive(Debug)]
pub struct TranscriptionMessage {
    pub job_id: JobId,
    pub url: CanonicalUrl,
}

/// Admits new jobs, deduplicates in-flight work and owns cancellation.
///
/// Submission never blocks on processing: the runner is reached through a
/// bounded channel and completion is observed by polling.
pub struct JobScheduler {
    store: Arc<dyn JobStore>,
    cache: Arc<dyn FingerprintCache>,
    sender: mpsc::Sender<TranscriptionMessage>,
    cancellations: Arc<CancellationRegistry>,
    estimated_processing_secs: u32,
}

impl JobScheduler {
    pub fn new(
        store: Arc<dyn JobStore>,
        cache: Arc<dyn FingerprintCache>,
        sender: mpsc::Sender<TranscriptionMessage>,
        cancellations: Arc<CancellationRegistry>,
        estimated_processing_secs: u32,
    ) -> Self {
        Self {
            store,
            cache,
            sender,
            cancellations,
            estimated_processing_secs,
        }
    }

    /// Entry point for `POST /transcribe`. Validates the URL before any
    /// state exists, then resolves in order: fingerprint cache, in-flight
    /// dedup, fresh admission.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self, raw_url: &str) -> Result<Job, SchedulerError> {
        let canonical = CanonicalUrl::parse(raw_url)?;

        if let Some(transcript) = self.cache.get(&canonical).await {
            let job = Job::completed_from_cache(raw_url.to_string(), canonical, transcript);
            self.store.insert(job.clone()).await?;
            tracing::info!(job_id = %job.id.as_uuid(), url = %job.canonical_url, "Cache hit, job completed on admission");
            return Ok(job);
        }

        let job = Job::new(
            raw_url.to_string(),
            canonical.clone(),
            self.estimated_processing_secs,
        );

        match self.store.insert_or_get_active(job).await? {
            Admission::InFlight(existing) => {
                tracing::info!(
                    job_id = %existing.id.as_uuid(),
                    url = %canonical,
                    "Equivalent job already in flight, returning existing id"
                );
                Ok(existing)
            }
            Admission::Created(job) => {
                self.cancellations.register(job.id);
                let msg = TranscriptionMessage {
                    job_id: job.id,
                    url: canonical,
                };
                if self.sender.send(msg).await.is_err() {
                    // Runner gone; fail the job rather than strand it queued.
                    self.cancellations.remove(job.id);
                    let failed = self
                        .store
                        .fail(job.id, "worker_failure", "transcription worker unavailable")
                        .await?;
                    tracing::error!(job_id = %job.id.as_uuid(), "Worker channel closed, job failed on admission");
                    return Ok(failed);
                }
                tracing::info!(job_id = %job.id.as_uuid(), url = %job.canonical_url, "Job queued");
                Ok(job)
            }
        }
    }

    /// Cancels a queued or processing job and signals the worker to abandon
    /// it. Cancelling a terminal job is a no-op and returns the job as-is.
    #[tracing::instrument(skip(self), fields(job_id = %id.as_uuid()))]
    pub async fn cancel(&self, id: JobId) -> Result<Job, SchedulerError> {
        let job = self.store.cancel(id).await.map_err(|e| match e {
            StoreError::NotFound(id) => SchedulerError::NotFound(id),
            other => SchedulerError::Store(other),
        })?;
        self.cancellations.cancel(id);
        tracing::info!(status = %job.status, "Cancellation handled");
        Ok(job)
    }

    pub async fn job(&self, id: JobId) -> Result<Option<Job>, SchedulerError> {
        Ok(self.store.get(id).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    InvalidUrl(#[from] UrlError),
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
