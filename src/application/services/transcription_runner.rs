use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    FingerprintCache, JobStore, ProgressUpdate, StoreError, TranscriptionEngine,
};
use crate::domain::{JobId, Transcript};

use super::{CancellationRegistry, TranscriptionMessage};

const PROGRESS_CHANNEL_CAPACITY: usize = 32;

/// Worker loop driving the external transcription engine.
///
/// Receives admitted jobs from the scheduler, walks them through
/// processing -> completed|failed and writes the fingerprint cache on
/// success. A cancelled job is abandoned mid-flight; its late completion is
/// refused by the terminal-state rule, so no cache entry is written for it.
pub struct TranscriptionRunner {
    receiver: mpsc::Receiver<TranscriptionMessage>,
    store: Arc<dyn JobStore>,
    cache: Arc<dyn FingerprintCache>,
    engine: Arc<dyn TranscriptionEngine>,
    cancellations: Arc<CancellationRegistry>,
}

impl TranscriptionRunner {
    pub fn new(
        receiver: mpsc::Receiver<TranscriptionMessage>,
        store: Arc<dyn JobStore>,
        cache: Arc<dyn FingerprintCache>,
        engine: Arc<dyn TranscriptionEngine>,
        cancellations: Arc<CancellationRegistry>,
    ) -> Self {
        Self {
            receiver,
            store,
            cache,
            engine,
            cancellations,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Transcription runner started");
        while let Some(msg) = self.receiver.recv().await {
            let span = tracing::info_span!(
                "transcription_job",
                job_id = %msg.job_id.as_uuid(),
                url = %msg.url,
            );
            let _guard = span.enter();

            if let Err(e) = self.process_job(msg).await {
                tracing::error!(error = %e, "Transcription job failed");
            }
        }
        tracing::info!("Transcription runner stopped: channel closed");
    }

    async fn process_job(&self, msg: TranscriptionMessage) -> Result<(), StoreError> {
        let job_id = msg.job_id;

        let token = self
            .cancellations
            .get(job_id)
            .unwrap_or_else(CancellationToken::new);

        match self.store.begin_processing(job_id).await {
            Ok(_) => {}
            Err(StoreError::TransitionRefused(e)) => {
                // Cancelled while still queued; nothing to do.
                tracing::info!(from = %e.from, "Skipping job no longer queued");
                self.cancellations.remove(job_id);
                return Ok(());
            }
            Err(e) => {
                self.cancellations.remove(job_id);
                return Err(e);
            }
        }

        let outcome = self.transcribe(job_id, &msg, &token).await;
        self.cancellations.remove(job_id);

        match outcome {
            Outcome::Finished(transcript) => {
                let billed_tokens = u64::from(transcript.word_count);
                match self
                    .store
                    .complete(job_id, transcript.clone(), billed_tokens)
                    .await
                {
                    Ok(job) => {
                        self.cache.put(job.canonical_url.clone(), transcript).await;
                        tracing::info!(billed_tokens, "Transcription completed");
                        Ok(())
                    }
                    Err(StoreError::TransitionRefused(e)) => {
                        // Worker finished after cancellation; drop the result.
                        tracing::info!(from = %e.from, "Dropping stale completion");
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            Outcome::Failed(message) => {
                match self.store.fail(job_id, "worker_failure", &message).await {
                    Ok(_) => {
                        tracing::warn!(error = %message, "Transcription failed");
                        Ok(())
                    }
                    Err(StoreError::TransitionRefused(e)) => {
                        tracing::info!(from = %e.from, "Dropping stale failure");
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            Outcome::Abandoned => {
                tracing::info!("Job abandoned after cancellation");
                Ok(())
            }
        }
    }

    async fn transcribe(
        &self,
        job_id: JobId,
        msg: &TranscriptionMessage,
        token: &CancellationToken,
    ) -> Outcome {
        let (progress_tx, progress_rx) = mpsc::channel::<ProgressUpdate>(PROGRESS_CHANNEL_CAPACITY);
        let progress_task = tokio::spawn(drain_progress(Arc::clone(&self.store), job_id, progress_rx));

        let result = tokio::select! {
            result = self.engine.transcribe(&msg.url, progress_tx) => Some(result),
            _ = token.cancelled() => None,
        };

        let _ = progress_task.await;

        match result {
            None => Outcome::Abandoned,
            Some(Ok(transcript)) => match transcript.validate() {
                Ok(()) => Outcome::Finished(transcript),
                Err(e) => Outcome::Failed(format!("malformed worker result: {}", e)),
            },
            Some(Err(e)) => Outcome::Failed(e.to_string()),
        }
    }
}

enum Outcome {
    Finished(Transcript),
    Failed(String),
    Abandoned,
}

async fn drain_progress(
    store: Arc<dyn JobStore>,
    job_id: JobId,
    mut receiver: mpsc::Receiver<ProgressUpdate>,
) {
    while let Some(update) = receiver.recv().await {
        if let Err(e) = store
            .record_progress(job_id, update.progress, Some(&update.step))
            .await
        {
            tracing::warn!(error = %e, "Failed to record progress update");
        }
    }
}
