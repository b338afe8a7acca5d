use std::collections::HashMap;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::JobId;

/// Tokens for signalling an in-flight worker to abandon a job.
///
/// A token is registered at submission and removed when the runner finishes
/// with the job, whichever way it ends.
#[derive(Default)]
pub struct CancellationRegistry {
    tokens: Mutex<HashMap<JobId, CancellationToken>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: JobId) -> CancellationToken {
        let token = CancellationToken::new();
        self.tokens.lock().insert(id, token.clone());
        token
    }

    pub fn get(&self, id: JobId) -> Option<CancellationToken> {
        self.tokens.lock().get(&id).cloned()
    }

    pub fn cancel(&self, id: JobId) {
        if let Some(token) = self.tokens.lock().remove(&id) {
            token.cancel();
        }
    }

    pub fn remove(&self, id: JobId) {
        self.tokens.lock().remove(&id);
    }
}
