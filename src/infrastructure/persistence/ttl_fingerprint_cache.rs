use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::ports::FingerprintCache;
use crate::domain::{CanonicalUrl, Transcript};

struct CacheEntry {
    transcript: Transcript,
    cached_at: Instant,
}

/// TTL fingerprint cache with lazy expiry on read.
///
/// An entry older than the TTL is treated as absent; no sweeper runs.
/// Concurrent puts for one key are last-writer-wins, which is safe because
/// transcripts for the same canonical URL are value-identical.
pub struct TtlFingerprintCache {
    entries: RwLock<HashMap<CanonicalUrl, CacheEntry>>,
    ttl: Duration,
}

impl TtlFingerprintCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn get_at(&self, url: &CanonicalUrl, now: Instant) -> Option<Transcript> {
        {
            let entries = self.entries.read();
            match entries.get(url) {
                Some(entry) if now.duration_since(entry.cached_at) <= self.ttl => {
                    return Some(entry.transcript.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: drop it so the map does not grow without bound.
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(url) {
            if now.duration_since(entry.cached_at) > self.ttl {
                entries.remove(url);
            }
        }
        None
    }
}

#[async_trait]
impl FingerprintCache for TtlFingerprintCache {
    async fn get(&self, url: &CanonicalUrl) -> Option<Transcript> {
        self.get_at(url, Instant::now())
    }

    async fn put(&self, url: CanonicalUrl, transcript: Transcript) {
        let mut entries = self.entries.write();
        entries.insert(
            url,
            CacheEntry {
                transcript,
                cached_at: Instant::now(),
            },
        );
    }
}
