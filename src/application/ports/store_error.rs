use crate::domain::TransitionError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("transition refused: {0}")]
    TransitionRefused(#[from] TransitionError),
}
