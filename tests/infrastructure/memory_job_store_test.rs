use std::sync::Arc;

use skald::application::ports::{Admission, JobStore, StoreError};
use skald::domain::{CanonicalUrl, Job, JobStatus, Transcript};
use skald::infrastructure::persistence::MemoryJobStore;

fn url(raw: &str) -> CanonicalUrl {
    CanonicalUrl::parse(raw).unwrap()
}

fn queued_job(raw: &str) -> Job {
    Job::new(raw.to_string(), url(raw), 120)
}

fn transcript() -> Transcript {
    let text = "store test transcript";
    Transcript {
        transcription: text.to_string(),
        transcript_hash: Transcript::content_hash(text),
        confidence: 0.9,
        language: "en".to_string(),
        duration_secs: 30.0,
        word_count: 3,
        speaker_count: 1,
        audio_quality: "high".to_string(),
        processing_time_ms: 10,
    }
}

#[tokio::test]
async fn given_empty_store_when_admitting_then_created() {
    let store = MemoryJobStore::new();
    let admission = store
        .insert_or_get_active(queued_job("https://example.com/a"))
        .await
        .unwrap();
    assert!(matches!(admission, Admission::Created(_)));
}

#[tokio::test]
async fn given_in_flight_job_when_admitting_same_url_then_existing_returned() {
    let store = MemoryJobStore::new();
    let first = match store
        .insert_or_get_active(queued_job("https://example.com/a"))
        .await
        .unwrap()
    {
        Admission::Created(job) => job,
        Admission::InFlight(_) => panic!("first admission must create"),
    };

    let second = store
        .insert_or_get_active(queued_job("https://example.com/a"))
        .await
        .unwrap();
    match second {
        Admission::InFlight(job) => assert_eq!(job.id, first.id),
        Admission::Created(_) => panic!("duplicate admission must dedup"),
    }
}

#[tokio::test]
async fn given_concurrent_admissions_when_same_url_then_exactly_one_created() {
    let store = Arc::new(MemoryJobStore::new());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .insert_or_get_active(queued_job("https://example.com/contended"))
                .await
                .unwrap()
        }));
    }

    let mut created = 0;
    let mut in_flight_ids = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Admission::Created(job) => {
                created += 1;
                in_flight_ids.push(job.id);
            }
            Admission::InFlight(job) => in_flight_ids.push(job.id),
        }
    }

    assert_eq!(created, 1);
    let first = in_flight_ids[0];
    assert!(in_flight_ids.iter().all(|id| *id == first));
}

#[tokio::test]
async fn given_terminal_job_when_admitting_same_url_then_new_job_created() {
    let store = MemoryJobStore::new();
    let job = match store
        .insert_or_get_active(queued_job("https://example.com/a"))
        .await
        .unwrap()
    {
        Admission::Created(job) => job,
        Admission::InFlight(_) => unreachable!(),
    };

    store.begin_processing(job.id).await.unwrap();
    store.fail(job.id, "worker_failure", "boom").await.unwrap();

    let second = store
        .insert_or_get_active(queued_job("https://example.com/a"))
        .await
        .unwrap();
    match second {
        Admission::Created(new_job) => assert_ne!(new_job.id, job.id),
        Admission::InFlight(_) => panic!("terminal job must not dedup"),
    }
}

#[tokio::test]
async fn given_completed_job_when_completing_again_then_transition_refused() {
    let store = MemoryJobStore::new();
    let job = match store
        .insert_or_get_active(queued_job("https://example.com/a"))
        .await
        .unwrap()
    {
        Admission::Created(job) => job,
        Admission::InFlight(_) => unreachable!(),
    };

    store.begin_processing(job.id).await.unwrap();
    store.complete(job.id, transcript(), 3).await.unwrap();

    let err = store.complete(job.id, transcript(), 3).await.unwrap_err();
    assert!(matches!(err, StoreError::TransitionRefused(_)));
}

#[tokio::test]
async fn given_cancelled_queued_job_when_runner_starts_then_refused() {
    let store = MemoryJobStore::new();
    let job = match store
        .insert_or_get_active(queued_job("https://example.com/a"))
        .await
        .unwrap()
    {
        Admission::Created(job) => job,
        Admission::InFlight(_) => unreachable!(),
    };

    let cancelled = store.cancel(job.id).await.unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);

    let err = store.begin_processing(job.id).await.unwrap_err();
    assert!(matches!(err, StoreError::TransitionRefused(_)));
}

#[tokio::test]
async fn given_unknown_id_when_fetching_then_none_and_transitions_not_found() {
    let store = MemoryJobStore::new();
    let ghost = queued_job("https://example.com/ghost");

    assert!(store.get(ghost.id).await.unwrap().is_none());
    assert!(matches!(
        store.begin_processing(ghost.id).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn given_jobs_in_various_states_when_counting_then_totals_match() {
    let store = MemoryJobStore::new();

    let a = match store
        .insert_or_get_active(queued_job("https://example.com/a"))
        .await
        .unwrap()
    {
        Admission::Created(job) => job,
        Admission::InFlight(_) => unreachable!(),
    };
    store.begin_processing(a.id).await.unwrap();
    store.complete(a.id, transcript(), 3).await.unwrap();

    let b = match store
        .insert_or_get_active(queued_job("https://example.com/b"))
        .await
        .unwrap()
    {
        Admission::Created(job) => job,
        Admission::InFlight(_) => unreachable!(),
    };
    store.begin_processing(b.id).await.unwrap();
    store.fail(b.id, "worker_failure", "boom").await.unwrap();

    store
        .insert_or_get_active(queued_job("https://example.com/c"))
        .await
        .unwrap();

    let counts = store.counts().await.unwrap();
    assert_eq!(counts.completed, 1);
    assert_eq!(counts.failed, 1);
    assert_eq!(counts.queued, 1);
    assert_eq!(counts.processing, 0);

    let failed = store.list_by_status(JobStatus::Failed).await.unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, b.id);
}
