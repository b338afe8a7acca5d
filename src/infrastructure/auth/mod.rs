mod rate_limiter;
mod signature_verifier;

pub use rate_limiter::RateLimiter;
pub use signature_verifier::{AuthError, SignatureVerifier, shared_secret_matches, sign};
