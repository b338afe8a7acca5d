mod canonical_url;
mod job;
mod job_status;
mod transcript;

pub use canonical_url::{CanonicalUrl, UrlError};
pub use job::{Job, JobId, TransitionError};
pub use job_status::JobStatus;
pub use transcript::{Transcript, TranscriptError};
