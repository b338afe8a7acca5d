use skald::application::services::project;
use skald::domain::{CanonicalUrl, Job, Transcript};

fn transcript() -> Transcript {
    let text = "projection test";
    Transcript {
        transcription: text.to_string(),
        transcript_hash: Transcript::content_hash(text),
        confidence: 0.9,
        language: "en".to_string(),
        duration_secs: 30.0,
        word_count: 2,
        speaker_count: 1,
        audio_quality: "high".to_string(),
        processing_time_ms: 10,
    }
}

fn queued_job() -> Job {
    Job::new(
        "https://example.com/talk".to_string(),
        CanonicalUrl::parse("https://example.com/talk").unwrap(),
        120,
    )
}

#[test]
fn given_queued_job_when_projected_then_only_base_fields_present() {
    let view = project(&queued_job());
    assert_eq!(view.status, "queued");
    assert_eq!(view.progress, 0);
    assert!(view.result.is_none());
    assert!(view.billed_tokens.is_none());
    assert!(view.error_code.is_none());
    assert!(view.completed_at.is_none());
}

#[test]
fn given_completed_job_when_projected_then_result_and_billing_present() {
    let mut job = queued_job();
    job.begin_processing().unwrap();
    job.complete(transcript(), 7).unwrap();

    let view = project(&job);
    assert_eq!(view.status, "completed");
    assert_eq!(view.progress, 100);
    assert!(view.result.is_some());
    assert_eq!(view.billed_tokens, Some(7));
    assert!(view.completed_at.is_some());
    assert!(view.error_code.is_none());
}

#[test]
fn given_failed_job_when_projected_then_error_fields_present_and_no_result() {
    let mut job = queued_job();
    job.begin_processing().unwrap();
    job.fail("worker_failure", "decoder crashed").unwrap();

    let view = project(&job);
    assert_eq!(view.status, "failed");
    assert!(view.result.is_none());
    assert!(view.billed_tokens.is_none());
    assert!(view.completed_at.is_none());
    assert_eq!(view.error_code.as_deref(), Some("worker_failure"));
    assert_eq!(view.error_message.as_deref(), Some("decoder crashed"));
}

#[test]
fn given_cancelled_job_when_projected_then_no_completion_timestamp() {
    let mut job = queued_job();
    job.begin_processing().unwrap();
    assert!(job.cancel());

    let view = project(&job);
    assert_eq!(view.status, "cancelled");
    assert!(view.completed_at.is_none());
    assert!(view.result.is_none());

    let value = serde_json::to_value(&view).unwrap();
    assert!(value.get("completedAt").is_none());
}

#[test]
fn given_view_when_serialized_then_optional_fields_omitted_not_null() {
    let view = project(&queued_job());
    let value = serde_json::to_value(&view).unwrap();
    assert!(value.get("result").is_none());
    assert!(value.get("errorCode").is_none());
    assert!(value.get("completedAt").is_none());
    assert!(value.get("submittedAt").is_some());
    assert!(value.get("id").is_some());
}
