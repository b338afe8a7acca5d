use skald::domain::{CanonicalUrl, Job, JobStatus, Transcript};

fn test_url() -> CanonicalUrl {
    CanonicalUrl::parse("https://example.com/talk").unwrap()
}

fn test_transcript() -> Transcript {
    let text = "hello from the test suite";
    Transcript {
        transcription: text.to_string(),
        transcript_hash: Transcript::content_hash(text),
        confidence: 0.95,
        language: "en".to_string(),
        duration_secs: 60.0,
        word_count: 5,
        speaker_count: 1,
        audio_quality: "high".to_string(),
        processing_time_ms: 1200,
    }
}

#[test]
fn given_new_job_when_created_then_queued_with_zero_progress() {
    let job = Job::new("https://example.com/talk".to_string(), test_url(), 120);
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.progress, 0);
    assert!(job.transcript.is_none());
    assert!(job.error_code.is_none());
    assert!(job.completed_at.is_none());
}

#[test]
fn given_queued_job_when_processing_and_completing_then_result_present() {
    let mut job = Job::new("https://example.com/talk".to_string(), test_url(), 120);
    job.begin_processing().unwrap();
    assert_eq!(job.status, JobStatus::Processing);

    job.complete(test_transcript(), 5).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
    assert!(job.transcript.is_some());
    assert!(job.completed_at.is_some());
    assert_eq!(job.billed_tokens, 5);
    assert!(job.error_code.is_none());
}

#[test]
fn given_processing_job_when_failing_then_error_fields_set_and_no_result() {
    let mut job = Job::new("https://example.com/talk".to_string(), test_url(), 120);
    job.begin_processing().unwrap();
    job.fail("worker_failure", "audio stream unreadable").unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_code.as_deref(), Some("worker_failure"));
    assert_eq!(job.error_message.as_deref(), Some("audio stream unreadable"));
    assert!(job.transcript.is_none());
}

#[test]
fn given_completed_job_when_completing_again_then_refused() {
    let mut job = Job::new("https://example.com/talk".to_string(), test_url(), 120);
    job.begin_processing().unwrap();
    job.complete(test_transcript(), 5).unwrap();

    let err = job.complete(test_transcript(), 5).unwrap_err();
    assert_eq!(err.from, JobStatus::Completed);
}

#[test]
fn given_cancelled_job_when_worker_completes_late_then_refused() {
    let mut job = Job::new("https://example.com/talk".to_string(), test_url(), 120);
    job.begin_processing().unwrap();
    assert!(job.cancel());

    assert!(job.complete(test_transcript(), 5).is_err());
    assert!(job.fail("worker_failure", "late").is_err());
    assert_eq!(job.status, JobStatus::Cancelled);
}

#[test]
fn given_terminal_job_when_cancelling_then_noop() {
    let mut job = Job::new("https://example.com/talk".to_string(), test_url(), 120);
    job.begin_processing().unwrap();
    job.complete(test_transcript(), 5).unwrap();

    assert!(!job.cancel());
    assert_eq!(job.status, JobStatus::Completed);
}

#[test]
fn given_processing_job_when_progress_decreases_then_ignored() {
    let mut job = Job::new("https://example.com/talk".to_string(), test_url(), 120);
    job.begin_processing().unwrap();

    job.record_progress(40, Some("transcribing"));
    assert_eq!(job.progress, 40);
    assert_eq!(job.current_step.as_deref(), Some("transcribing"));

    job.record_progress(25, Some("downloading"));
    assert_eq!(job.progress, 40);
    assert_eq!(job.current_step.as_deref(), Some("transcribing"));

    job.record_progress(80, None);
    assert_eq!(job.progress, 80);
}

#[test]
fn given_queued_job_when_progress_reported_then_ignored() {
    let mut job = Job::new("https://example.com/talk".to_string(), test_url(), 120);
    job.record_progress(50, Some("transcribing"));
    assert_eq!(job.progress, 0);
    assert!(job.current_step.is_none());
}

#[test]
fn given_overflowing_progress_when_recorded_then_clamped_to_hundred() {
    let mut job = Job::new("https://example.com/talk".to_string(), test_url(), 120);
    job.begin_processing().unwrap();
    job.record_progress(250, None);
    assert_eq!(job.progress, 100);
}

#[test]
fn given_cache_hit_job_when_synthesized_then_completed_with_zero_billing() {
    let job = Job::completed_from_cache(
        "https://example.com/talk".to_string(),
        test_url(),
        test_transcript(),
    );
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
    assert_eq!(job.billed_tokens, 0);
    assert!(job.transcript.is_some());
    assert!(job.completed_at.is_some());
}
