use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Completed transcription result.
///
/// `transcript_hash` is the lowercase hex SHA-256 of the transcription bytes
/// and must always be recomputable by an independent verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub transcription: String,
    pub transcript_hash: String,
    pub confidence: f64,
    pub language: String,
    #[serde(rename = "duration")]
    pub duration_secs: f64,
    pub word_count: u32,
    pub speaker_count: u32,
    pub audio_quality: String,
    #[serde(rename = "processingTime")]
    pub processing_time_ms: u64,
}

impl Transcript {
    pub fn content_hash(transcription: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(transcription.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Enforces the value ranges and the hash cross-check. Anything a worker
    /// hands back that fails here is treated as a malformed result.
    pub fn validate(&self) -> Result<(), TranscriptError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(TranscriptError::ConfidenceOutOfRange(self.confidence));
        }
        if self.duration_secs <= 0.0 {
            return Err(TranscriptError::NonPositiveDuration(self.duration_secs));
        }
        if self.speaker_count < 1 {
            return Err(TranscriptError::NoSpeakers);
        }
        let recomputed = Self::content_hash(&self.transcription);
        if recomputed != self.transcript_hash {
            return Err(TranscriptError::HashMismatch {
                declared: self.transcript_hash.clone(),
                recomputed,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),
    #[error("duration {0} is not positive")]
    NonPositiveDuration(f64),
    #[error("speaker count must be at least 1")]
    NoSpeakers,
    #[error("transcript hash mismatch: declared {declared}, recomputed {recomputed}")]
    HashMismatch { declared: String, recomputed: String },
}
