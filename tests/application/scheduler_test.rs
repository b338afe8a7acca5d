use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use skald::application::ports::{FingerprintCache, JobStore};
use skald::application::services::{CancellationRegistry, JobScheduler, SchedulerError};
use skald::domain::{CanonicalUrl, JobStatus, Transcript};
use skald::infrastructure::persistence::{MemoryJobStore, TtlFingerprintCache};

fn transcript(text: &str) -> Transcript {
    Transcript {
        transcription: text.to_string(),
        transcript_hash: Transcript::content_hash(text),
        confidence: 0.9,
        language: "en".to_string(),
        duration_secs: 45.0,
        word_count: 4,
        speaker_count: 1,
        audio_quality: "high".to_string(),
        processing_time_ms: 20,
    }
}

struct Harness {
    scheduler: JobScheduler,
    store: Arc<MemoryJobStore>,
    cache: Arc<TtlFingerprintCache>,
    // Held open so handoff does not fail on a closed channel.
    _receiver: mpsc::Receiver<skald::application::services::TranscriptionMessage>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryJobStore::new());
    let cache = Arc::new(TtlFingerprintCache::new(Duration::from_secs(3600)));
    let (sender, receiver) = mpsc::channel(16);

    let scheduler = JobScheduler::new(
        Arc::clone(&store) as Arc<dyn JobStore>,
        Arc::clone(&cache) as Arc<dyn FingerprintCache>,
        sender,
        Arc::new(CancellationRegistry::new()),
        120,
    );

    Harness {
        scheduler,
        store,
        cache,
        _receiver: receiver,
    }
}

#[tokio::test]
async fn given_malformed_url_when_submitted_then_rejected_before_any_state() {
    let h = harness();

    let err = h.scheduler.submit("not a url").await.unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidUrl(_)));
    assert!(h.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn given_disallowed_scheme_when_submitted_then_rejected() {
    let h = harness();
    let err = h.scheduler.submit("file:///etc/passwd").await.unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidUrl(_)));
}

#[tokio::test]
async fn given_fresh_url_when_submitted_then_job_queued() {
    let h = harness();
    let job = h.scheduler.submit("https://example.com/talk").await.unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.estimated_processing_secs, 120);
}

#[tokio::test]
async fn given_cached_url_when_submitted_then_completed_job_with_zero_billing() {
    let h = harness();
    let url = CanonicalUrl::parse("https://example.com/talk").unwrap();
    let cached = transcript("cached result text");
    h.cache.put(url, cached.clone()).await;

    let job = h
        .scheduler
        .submit("https://example.com/talk?utm_source=mail")
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.billed_tokens, 0);
    assert_eq!(
        job.transcript.as_ref().unwrap().transcript_hash,
        cached.transcript_hash
    );

    // The synthesized job is a real record, pollable like any other.
    let fetched = h.store.get(job.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, JobStatus::Completed);
}

#[tokio::test]
async fn given_in_flight_url_when_resubmitted_then_same_job_id() {
    let h = harness();
    let first = h.scheduler.submit("https://example.com/talk").await.unwrap();
    let second = h
        .scheduler
        .submit("https://example.com/talk/")
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn given_closed_worker_channel_when_submitted_then_job_failed_not_stranded() {
    let h = harness();
    drop(h._receiver);

    let job = h.scheduler.submit("https://example.com/talk").await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_code.as_deref(), Some("worker_failure"));
}

#[tokio::test]
async fn given_queued_job_when_cancelled_then_cancelled_and_resubmission_creates_new_job() {
    let h = harness();
    let job = h.scheduler.submit("https://example.com/talk").await.unwrap();

    let cancelled = h.scheduler.cancel(job.id).await.unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);

    // Idempotent: cancelling a terminal job is a no-op.
    let again = h.scheduler.cancel(job.id).await.unwrap();
    assert_eq!(again.status, JobStatus::Cancelled);

    let replacement = h.scheduler.submit("https://example.com/talk").await.unwrap();
    assert_ne!(replacement.id, job.id);
    assert_eq!(replacement.status, JobStatus::Queued);
}

#[tokio::test]
async fn given_unknown_job_when_cancelled_then_not_found() {
    let h = harness();
    let ghost = skald::domain::JobId::new();
    assert!(matches!(
        h.scheduler.cancel(ghost).await.unwrap_err(),
        SchedulerError::NotFound(_)
    ));
}
