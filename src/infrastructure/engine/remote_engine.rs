use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{EngineError, ProgressSink, ProgressUpdate, TranscriptionEngine};
use crate::domain::{CanonicalUrl, Transcript};

/// Header for the simple shared-secret deployment mode between this service
/// and its worker. Distinct from the signed client scheme; never conflated.
const ENGINE_AUTH_HEADER: &str = "X-Engine-Auth";

#[derive(Serialize)]
struct WorkerRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkerResponse {
    transcription: String,
    #[serde(default)]
    transcript_hash: Option<String>,
    confidence: f64,
    language: String,
    duration: f64,
    word_count: u32,
    speaker_count: u32,
    audio_quality: String,
    processing_time: u64,
}

/// Adapter for a remote transcription worker reached over HTTP.
///
/// The worker call is synchronous from the adapter's point of view; the
/// runner owns timeouts via the client-level deadline configured here.
pub struct RemoteTranscriptionEngine {
    client: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl RemoteTranscriptionEngine {
    pub fn new(endpoint: String, secret: String, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::ApiRequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            secret,
        })
    }
}

#[async_trait]
impl TranscriptionEngine for RemoteTranscriptionEngine {
    async fn transcribe(
        &self,
        url: &CanonicalUrl,
        progress: ProgressSink,
    ) -> Result<Transcript, EngineError> {
        let _ = progress
            .send(ProgressUpdate {
                progress: 5,
                step: "dispatching".to_string(),
            })
            .await;

        let response = self
            .client
            .post(format!("{}/transcribe", self.endpoint))
            .header(ENGINE_AUTH_HEADER, &self.secret)
            .json(&WorkerRequest { url: url.as_str() })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout(e.to_string())
                } else {
                    EngineError::ApiRequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::TranscriptionFailed(format!(
                "worker returned {}: {}",
                status, body
            )));
        }

        let payload: WorkerResponse = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let _ = progress
            .send(ProgressUpdate {
                progress: 95,
                step: "finalizing".to_string(),
            })
            .await;

        let transcript_hash = payload
            .transcript_hash
            .unwrap_or_else(|| Transcript::content_hash(&payload.transcription));

        Ok(Transcript {
            transcription: payload.transcription,
            transcript_hash,
            confidence: payload.confidence,
            language: payload.language,
            duration_secs: payload.duration,
            word_count: payload.word_count,
            speaker_count: payload.speaker_count,
            audio_quality: payload.audio_quality,
            processing_time_ms: payload.processing_time,
        })
    }
}
