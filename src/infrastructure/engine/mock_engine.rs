use std::time::{Duration, Instant};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::application::ports::{EngineError, ProgressSink, ProgressUpdate, TranscriptionEngine};
use crate::domain::{CanonicalUrl, Transcript};

const AUDIO_QUALITIES: &[&str] = &["low", "medium", "high"];

/// Deterministic engine for tests and local development. The transcript is a
/// pure function of the canonical URL, so repeated runs produce bit-identical
/// results and hashes.
pub struct MockTranscriptionEngine {
    step_delay: Duration,
}

impl MockTranscriptionEngine {
    pub fn new() -> Self {
        Self {
            step_delay: Duration::ZERO,
        }
    }

    /// Slows each phase down, useful when exercising cancellation and
    /// progress polling by hand.
    pub fn with_step_delay(step_delay: Duration) -> Self {
        Self { step_delay }
    }
}

impl Default for MockTranscriptionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(
        &self,
        url: &CanonicalUrl,
        progress: ProgressSink,
    ) -> Result<Transcript, EngineError> {
        let started = Instant::now();

        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let seed = hasher.finalize();

        for (pct, step) in [(10, "downloading"), (40, "transcribing"), (85, "formatting")] {
            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }
            let _ = progress
                .send(ProgressUpdate {
                    progress: pct,
                    step: step.to_string(),
                })
                .await;
        }

        let sentences = 3 + usize::from(seed[1] % 5);
        let mut transcription = String::new();
        for i in 0..sentences {
            transcription.push_str(&format!(
                "Segment {} of the recording at {}. ",
                i + 1,
                url.as_str()
            ));
        }
        let transcription = transcription.trim_end().to_string();

        let word_count = transcription.split_whitespace().count() as u32;
        let duration_secs = 30.0 + f64::from(seed[2]) * 2.0;

        Ok(Transcript {
            transcript_hash: Transcript::content_hash(&transcription),
            transcription,
            confidence: 0.80 + f64::from(seed[3] % 20) / 100.0,
            language: "en".to_string(),
            duration_secs,
            word_count,
            speaker_count: 1 + u32::from(seed[4] % 3),
            audio_quality: AUDIO_QUALITIES[usize::from(seed[5]) % AUDIO_QUALITIES.len()]
                .to_string(),
            processing_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}
