use skald::infrastructure::auth::{SignatureVerifier, shared_secret_matches, sign};

const SECRET: &str = "test-signing-secret";
const SKEW_MS: i64 = 300_000;

fn verifier() -> SignatureVerifier {
    SignatureVerifier::new(SKEW_MS)
}

#[test]
fn given_correctly_signed_request_when_verified_then_accepted() {
    let now = 1_700_000_000_000;
    let body = br#"{"url":"https://example.com/talk"}"#;
    let signature = sign("POST", "/api/transcribe", body, now, SECRET);

    assert!(
        verifier()
            .verify("POST", "/api/transcribe", body, now, &signature, SECRET, now)
            .is_ok()
    );
}

#[test]
fn given_wrong_secret_when_verified_then_rejected() {
    let now = 1_700_000_000_000;
    let body = br#"{"url":"https://example.com/talk"}"#;
    let signature = sign("POST", "/api/transcribe", body, now, "other-secret");

    assert!(
        verifier()
            .verify("POST", "/api/transcribe", body, now, &signature, SECRET, now)
            .is_err()
    );
}

#[test]
fn given_tampered_body_when_verified_then_rejected() {
    let now = 1_700_000_000_000;
    let signed_body = br#"{"url":"https://example.com/talk"}"#;
    let wire_body = br#"{"url":"https://example.com/other"}"#;
    let signature = sign("POST", "/api/transcribe", signed_body, now, SECRET);

    assert!(
        verifier()
            .verify("POST", "/api/transcribe", wire_body, now, &signature, SECRET, now)
            .is_err()
    );
}

#[test]
fn given_rewritten_path_when_verified_then_rejected() {
    let now = 1_700_000_000_000;
    let body = b"{}";
    let signature = sign("POST", "/api/transcribe", body, now, SECRET);

    assert!(
        verifier()
            .verify("POST", "/transcribe", body, now, &signature, SECRET, now)
            .is_err()
    );
}

#[test]
fn given_timestamp_outside_skew_when_verified_then_rejected() {
    let now = 1_700_000_000_000;
    let stale = now - SKEW_MS - 1;
    let body = b"{}";
    let signature = sign("POST", "/api/transcribe", body, stale, SECRET);

    assert!(
        verifier()
            .verify("POST", "/api/transcribe", body, stale, &signature, SECRET, now)
            .is_err()
    );
}

#[test]
fn given_timestamp_just_inside_skew_when_verified_then_accepted() {
    let now = 1_700_000_000_000;
    let old_but_valid = now - SKEW_MS;
    let body = b"{}";
    let signature = sign("POST", "/api/transcribe", body, old_but_valid, SECRET);

    assert!(
        verifier()
            .verify(
                "POST",
                "/api/transcribe",
                body,
                old_but_valid,
                &signature,
                SECRET,
                now
            )
            .is_ok()
    );
}

#[test]
fn given_signature_when_computed_then_lowercase_hex() {
    let signature = sign("POST", "/api/transcribe", b"{}", 0, SECRET);
    assert_eq!(signature.len(), 64);
    assert!(
        signature
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    );
}

#[test]
fn given_shared_secret_comparison_then_exact_match_required() {
    assert!(shared_secret_matches("abc", "abc"));
    assert!(!shared_secret_matches("abc", "abd"));
    assert!(!shared_secret_matches("abc", "abcd"));
    assert!(!shared_secret_matches("", "abc"));
}
