//! Signed cookie helpers for session resolution.
//!
//! Uses HMAC-SHA256 to sign session IDs, making cookies tamper-proof. The
//! `active-team` cookie is deliberately not signed; it carries a
//! preference, not an identity.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::SecretString;

type HmacSha256 = Hmac<Sha256>;

/// Signs a session ID with HMAC-SHA256.
///
/// Returns a string in the format `{session_id}.{signature}`.
pub fn sign_session_id(session_id: &str, secret: &SecretString) -> String {
    let signature = compute_hmac(session_id.as_bytes(), secret.expose_secret().as_bytes());
    format!("{}.{}", session_id, hex::encode(signature))
}

/// Verifies a signed cookie value and extracts the session ID.
///
/// Returns `None` if the signature is invalid (tampered).
pub fn verify_signed_cookie(cookie_value: &str, secret: &SecretString) -> Option<String> {
    let (session_id, signature_hex) = cookie_value.rsplit_once('.')?;

    let actual_sig = hex::decode(signature_hex).ok()?;
    let expected_sig = compute_hmac(session_id.as_bytes(), secret.expose_secret().as_bytes());

    if constant_time_eq(&expected_sig, &actual_sig) {
        Some(session_id.to_owned())
    } else {
        log::warn!(
            target: "roster::access",
            "msg=\"session cookie tampered\" cookie_prefix=\"{}...\"",
            &cookie_value.chars().take(8).collect::<String>()
        );
        None
    }
}

/// Computes HMAC-SHA256.
///
/// # Panics
///
/// This function cannot panic as HMAC accepts keys of any size.
fn compute_hmac(message: &[u8], key: &[u8]) -> Vec<u8> {
    // HmacSha256::new_from_slice only fails on an invalid key, and
    // HMAC-SHA256 accepts keys of any length, so this cannot fail.
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
