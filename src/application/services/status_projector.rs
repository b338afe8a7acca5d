use serde::Serialize;

use crate::domain::{Job, JobStatus, Transcript};

/// Externally observable status payload. One canonical schema: `id`,
/// `status`, `progress`; the legacy `request_id`/`phase`/`percent` aliases
/// from older clients are not accepted or emitted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    pub id: String,
    pub status: String,
    pub progress: u8,
    pub submitted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Transcript>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billed_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Pure read transform from a job record to its status payload. The result,
/// billing and completion timestamp appear only on completed jobs, error
/// fields only on failed ones; the record's internal terminal timestamp for
/// failed and cancelled jobs stays off the wire.
pub fn project(job: &Job) -> JobStatusView {
    let completed = job.status == JobStatus::Completed;
    let failed = job.status == JobStatus::Failed;

    JobStatusView {
        id: job.id.as_uuid().to_string(),
        status: job.status.as_str().to_string(),
        progress: job.progress,
        submitted_at: job.submitted_at.to_rfc3339(),
        current_step: job.current_step.clone(),
        completed_at: completed
            .then(|| job.completed_at.map(|t| t.to_rfc3339()))
            .flatten(),
        result: completed.then(|| job.transcript.clone()).flatten(),
        billed_tokens: completed.then_some(job.billed_tokens),
        error_code: failed.then(|| job.error_code.clone()).flatten(),
        error_message: failed.then(|| job.error_message.clone()).flatten(),
    }
}
