use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::JobStore;
use crate::application::services::{JobScheduler, TranscriptionMessage};
use crate::infrastructure::auth::{RateLimiter, SignatureVerifier};

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<JobScheduler>,
    pub store: Arc<dyn JobStore>,
    pub verifier: SignatureVerifier,
    pub limiter: Arc<RateLimiter>,
    /// API key -> signing secret for the signed endpoint family.
    pub credentials: Arc<HashMap<String, String>>,
    /// Shared secret for the `X-Engine-Auth` endpoint family.
    pub engine_secret: Arc<str>,
    /// Kept for queue depth reporting on the operational surface.
    pub queue_sender: mpsc::Sender<TranscriptionMessage>,
}
