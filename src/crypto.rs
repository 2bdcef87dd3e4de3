//! Token generation and hashing for invitations and service keys.
//!
//! Invitation tokens and service keys are high-entropy random strings, so
//! a fast hash like SHA-256 is appropriate for storage; only the hash is
//! ever persisted and the raw value surfaces exactly once.

use sha2::{Digest, Sha256};

use crate::SecretString;

/// Default token length in characters.
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// Prefix carried by every team service key.
///
/// The access layer uses the same prefix to recognize bearer credentials
/// that should be resolved against the key store.
pub const SERVICE_KEY_PREFIX: &str = "ne_team_";

/// Generates a cryptographically secure random token.
///
/// The token consists of alphanumeric characters (a-z, A-Z, 0-9),
/// providing approximately 5.95 bits of entropy per character.
pub fn generate_token(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

/// Generates a token with the default length (32 characters).
pub fn generate_token_default() -> String {
    generate_token(DEFAULT_TOKEN_LENGTH)
}

/// Mints a raw team service key: the `ne_team_` prefix plus a random
/// token. The caller must hash it for storage; the raw value is shown to
/// the user once and never again.
pub fn mint_service_key(token_length: usize) -> SecretString {
    SecretString::new(format!(
        "{SERVICE_KEY_PREFIX}{}",
        generate_token(token_length)
    ))
}

/// Hashes a token using SHA-256 for secure storage.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_length() {
        let token = generate_token(32);
        assert_eq!(token.len(), 32);

        let token = generate_token(48);
        assert_eq!(token.len(), 48);
    }

    #[test]
    fn test_generate_token_unique() {
        let token1 = generate_token(32);
        let token2 = generate_token(32);
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_generate_token_alphanumeric() {
        let token = generate_token(100);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_mint_service_key_prefix() {
        let key = mint_service_key(DEFAULT_TOKEN_LENGTH);
        assert!(key.expose_secret().starts_with(SERVICE_KEY_PREFIX));
        assert_eq!(
            key.expose_secret().len(),
            SERVICE_KEY_PREFIX.len() + DEFAULT_TOKEN_LENGTH
        );
    }

    #[test]
    fn test_mint_service_key_redacted_in_debug() {
        let key = mint_service_key(DEFAULT_TOKEN_LENGTH);
        assert_eq!(format!("{key:?}"), "SecretString([REDACTED])");
    }

    #[test]
    fn test_hash_token_deterministic() {
        let token = "abc123";
        assert_eq!(hash_token(token), hash_token(token));
    }

    #[test]
    fn test_hash_token_different_inputs() {
        assert_ne!(hash_token("token1"), hash_token("token2"));
    }

    #[test]
    fn test_hash_token_length() {
        // SHA-256 produces 64 hex characters
        assert_eq!(hash_token("anytoken").len(), 64);
    }
}
