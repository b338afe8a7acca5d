use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Validates the signed request scheme: HMAC-SHA256 over
/// `METHOD\nPATH\nBODY\nTIMESTAMP` with the credential secret, lowercase hex
/// on the wire. Fails closed on any mismatch or timestamp skew.
#[derive(Debug, Clone, Copy)]
pub struct SignatureVerifier {
    max_skew_ms: i64,
}

impl SignatureVerifier {
    pub fn new(max_skew_ms: i64) -> Self {
        Self { max_skew_ms }
    }

    /// The body is the literal wire bytes; re-serialization would break the
    /// canonical string.
    pub fn verify(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        timestamp_ms: i64,
        signature_hex: &str,
        secret: &str,
        now_ms: i64,
    ) -> Result<(), AuthError> {
        if (now_ms - timestamp_ms).abs() > self.max_skew_ms {
            return Err(AuthError::TimestampSkew);
        }

        let expected = sign(method, path, body, timestamp_ms, secret);
        if expected.as_bytes().ct_eq(signature_hex.as_bytes()).into() {
            Ok(())
        } else {
            Err(AuthError::SignatureMismatch)
        }
    }
}

/// Computes the signature a client must send. Exposed so callers and tests
/// share one canonical-string definition.
pub fn sign(method: &str, path: &str, body: &[u8], timestamp_ms: i64, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(method.as_bytes());
    mac.update(b"\n");
    mac.update(path.as_bytes());
    mac.update(b"\n");
    mac.update(body);
    mac.update(b"\n");
    mac.update(timestamp_ms.to_string().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison for the shared-secret `X-Engine-Auth` scheme.
pub fn shared_secret_matches(presented: &str, configured: &str) -> bool {
    presented.as_bytes().ct_eq(configured.as_bytes()).into()
}

/// Every variant classifies as `unauthorized`; messages stay generic so no
/// secret material leaks into responses or logs.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("timestamp outside allowed skew")]
    TimestampSkew,
    #[error("signature mismatch")]
    SignatureMismatch,
}
