use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as BASE64};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a random 256-bit secret.
pub fn generate_secret() -> [u8; 32] {
    let mut key = [0u8; 32];
    rand::rng().fill_bytes(&mut key);
    key
}

/// Opaque bearer token for the admin session.
pub fn generate_session_token() -> String {
    BASE64.encode(generate_secret())
}

/// Short hex digest of a secret, safe to log.
pub fn fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_random() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn session_token_is_url_safe() {
        let token = generate_session_token();
        assert_eq!(token.len(), 43);
        assert!(token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let secret = [7u8; 32];
        assert_eq!(fingerprint(&secret), fingerprint(&secret));
        assert_eq!(fingerprint(&secret).len(), 16);
        assert_ne!(fingerprint(&secret), fingerprint(&[8u8; 32]));
    }
}
