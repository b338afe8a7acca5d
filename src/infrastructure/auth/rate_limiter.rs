use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

struct RateBucket {
    tokens: f64,
    last_refill: Instant,
}

/// Per-credential token bucket gating job submission.
///
/// Buckets are fully independent, keyed by API key; the map mutex serializes
/// the read-modify-write so parallel requests cannot over-admit.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, RateBucket>>,
    capacity: f64,
    refill_per_sec: f64,
}

impl RateLimiter {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            capacity: f64::from(capacity),
            refill_per_sec,
        }
    }

    /// Takes one token for `key`, or reports how long until the next token
    /// becomes available (the `Retry-After` hint).
    pub fn acquire(&self, key: &str) -> Result<(), Duration> {
        self.acquire_at(key, Instant::now())
    }

    fn acquire_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(key.to_string()).or_insert(RateBucket {
            tokens: self.capacity,
            last_refill: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_refill);
        bucket.tokens =
            (bucket.tokens + elapsed.as_secs_f64() * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - bucket.tokens;
            Err(Duration::from_secs_f64(missing / self.refill_per_sec))
        }
    }
}
