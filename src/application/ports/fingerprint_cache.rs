use async_trait::async_trait;

use crate::domain::{CanonicalUrl, Transcript};

/// Maps a canonical URL to a previously completed transcript.
///
/// Within the TTL window, repeated gets for one key return byte-identical
/// transcripts; an expired entry is indistinguishable from one never cached.
#[async_trait]
pub trait FingerprintCache: Send + Sync {
    async fn get(&self, url: &CanonicalUrl) -> Option<Transcript>;

    async fn put(&self, url: CanonicalUrl, transcript: Transcript);
}
