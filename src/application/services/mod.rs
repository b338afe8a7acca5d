mod cancellation;
mod job_scheduler;
mod status_projector;
mod transcription_runner;

pub use cancellation::CancellationRegistry;
pub use job_scheduler::{JobScheduler, SchedulerError, TranscriptionMessage};
pub use status_projector::{JobStatusView, project};
pub use transcription_runner::TranscriptionRunner;
