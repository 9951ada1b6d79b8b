//! Time-limited unsubscribe tokens.
//!
//! Tokens are HS256 JWTs carrying `{email, iat, exp}`. The HMAC key is
//! derived from the application key and the current rotating secret, so a
//! rotation invalidates every token issued before it.

use chrono::{DateTime, Utc};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;

use crate::rotation::RotatingSecret;

type HmacSha256 = Hmac<Sha256>;

/// Tokens older than two days are rejected regardless of rotation.
pub const EXPIRATION_SECS: i64 = 172_800;

const SALT: &[u8] = b"unsubscribe";

/// Claims of an unsubscribe token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribePayload {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("signing secret has not been generated yet")]
    Uninitialized,
    #[error("invalid signing key")]
    InvalidKey,
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl From<InvalidLength> for TokenError {
    fn from(_: InvalidLength) -> Self {
        TokenError::InvalidKey
    }
}

/// Signs and verifies unsubscribe tokens with whatever secret the shared
/// `RotatingSecret` holds at the time of the call.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Arc<RotatingSecret>,
    app_key: Arc<[u8]>,
}

impl TokenSigner {
    pub fn new(secret: Arc<RotatingSecret>, app_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret,
            app_key: Arc::from(app_key.as_ref()),
        }
    }

    pub fn generate_unsubscribe_token(&self, email: &str) -> Result<String, TokenError> {
        self.issue_at(email, Utc::now())
    }

    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let key = self.signing_key()?;

        let claims = UnsubscribePayload {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + EXPIRATION_SECS,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&key),
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// `Err(Malformed)` when the token cannot be a token at all,
    /// `Ok(None)` when it is well-formed but expired or signed under a
    /// different secret.
    pub fn verify_token(&self, token: &str) -> Result<Option<UnsubscribePayload>, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UnsubscribePayload>, TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3
            || segments.iter().any(|s| s.is_empty() || !s.bytes().all(is_base64_url_byte))
        {
            return Err(TokenError::Malformed);
        }

        // A header we cannot read was not written by us
        if decode_header(token).is_err() {
            return Ok(None);
        }

        let key = self.signing_key()?;

        // Expiry is checked against `now` below, not the system clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = match decode::<UnsubscribePayload>(token, &DecodingKey::from_secret(&key), &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::ExpiredSignature
                    | ErrorKind::ImmatureSignature => Ok(None),
                    _ => Err(TokenError::Malformed),
                };
            }
        };

        let age = now.timestamp().saturating_sub(claims.iat);
        if !(0..=EXPIRATION_SECS).contains(&age) || now.timestamp() > claims.exp {
            return Ok(None);
        }

        Ok(Some(claims))
    }

    fn signing_key(&self) -> Result<[u8; 32], TokenError> {
        let secret = self.secret.current_secret().ok_or(TokenError::Uninitialized)?;

        let mut mac = HmacSha256::new_from_slice(&self.app_key)?;
        mac.update(&secret);
        mac.update(SALT);

        let mut key = [0u8; 32];
        key.copy_from_slice(&mac.finalize().into_bytes());
        Ok(key)
    }
}

fn is_base64_url_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 12, 23, 32, 8).unwrap()
    }

    fn signer() -> TokenSigner {
        let secret = Arc::new(RotatingSecret::new());
        secret.maybe_rotate(now());
        TokenSigner::new(secret, "test-app-key")
    }

    #[test]
    fn verifies_own_token() {
        let signer = signer();
        let token = signer.issue_at("testing@test.com", now()).unwrap();

        assert_eq!(token.split('.').count(), 3);
        let payload = signer.verify_at(&token, now() + Duration::hours(1)).unwrap();
        assert_eq!(payload.map(|p| p.email).as_deref(), Some("testing@test.com"));
    }

    #[test]
    fn expires_after_two_days() {
        let signer = signer();
        let token = signer.issue_at("testing@test.com", now()).unwrap();

        let edge = now() + Duration::seconds(EXPIRATION_SECS);
        assert!(signer.verify_at(&token, edge).unwrap().is_some());
        assert_eq!(signer.verify_at(&token, edge + Duration::seconds(1)), Ok(None));
    }

    #[test]
    fn future_timestamp_is_rejected() {
        let signer = signer();
        let token = signer.issue_at("testing@test.com", now() + Duration::minutes(5)).unwrap();
        assert_eq!(signer.verify_at(&token, now()), Ok(None));
    }

    #[test]
    fn rotation_invalidates_outstanding_tokens() {
        let secret = Arc::new(RotatingSecret::new());
        secret.maybe_rotate(now());
        let signer = TokenSigner::new(secret.clone(), "test-app-key");

        let token = signer.issue_at("testing@test.com", now()).unwrap();
        assert!(secret.maybe_rotate(now() + Duration::days(2)));
        assert_eq!(signer.verify_at(&token, now() + Duration::hours(1)), Ok(None));
    }

    #[test]
    fn app_key_is_part_of_the_signature() {
        let secret = Arc::new(RotatingSecret::new());
        secret.maybe_rotate(now());
        let ours = TokenSigner::new(secret.clone(), "one");
        let theirs = TokenSigner::new(secret, "two");

        let token = theirs.issue_at("testing@test.com", now()).unwrap();
        assert_eq!(ours.verify_at(&token, now()), Ok(None));
    }

    #[test]
    fn swapped_payload_fails_signature() {
        let signer = signer();
        let mine = signer.issue_at("mine@test.com", now()).unwrap();
        let other = signer.issue_at("other@test.com", now()).unwrap();

        let (other_body, _) = other.rsplit_once('.').unwrap();
        let (_, my_signature) = mine.rsplit_once('.').unwrap();
        let forged = format!("{other_body}.{my_signature}");
        assert_eq!(signer.verify_at(&forged, now()), Ok(None));
    }

    #[test]
    fn well_formed_garbage_is_a_mismatch() {
        assert_eq!(signer().verify_at("123abc.zien.duecb89d", now()), Ok(None));
    }

    #[test]
    fn malformed_tokens_are_hard_errors() {
        let signer = signer();
        for token in ["", "abc", "a.b", "a..c", "a.b.c.d", "a!.b.c", "ab=.cd.ef"] {
            assert_eq!(signer.verify_at(token, now()), Err(TokenError::Malformed), "{token:?}");
        }
    }

    #[test]
    fn bad_payload_behind_valid_signature_is_malformed() {
        let signer = signer();
        let claims = serde_json::json!({
            "iat": now().timestamp(),
            "exp": now().timestamp() + EXPIRATION_SECS,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&signer.signing_key().unwrap()),
        )
        .unwrap();

        assert_eq!(signer.verify_at(&token, now()), Err(TokenError::Malformed));
    }

    #[test]
    fn claims_carry_the_window() {
        let signer = signer();
        let token = signer.issue_at("testing@test.com", now()).unwrap();

        let claims = signer.verify_at(&token, now()).unwrap().unwrap();
        assert_eq!(claims.iat, now().timestamp());
        assert_eq!(claims.exp, now().timestamp() + EXPIRATION_SECS);
    }

    #[test]
    fn other_algorithms_are_a_mismatch() {
        let signer = signer();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &UnsubscribePayload {
                email: "testing@test.com".into(),
                iat: now().timestamp(),
                exp: now().timestamp() + EXPIRATION_SECS,
            },
            &EncodingKey::from_secret(&signer.signing_key().unwrap()),
        )
        .unwrap();

        assert_eq!(signer.verify_at(&token, now()), Ok(None));
    }

    #[test]
    fn uninitialized_secret_cannot_sign() {
        let signer = TokenSigner::new(Arc::new(RotatingSecret::new()), "test-app-key");
        assert_eq!(
            signer.generate_unsubscribe_token("testing@test.com"),
            Err(TokenError::Uninitialized)
        );
    }
}
