/// Signed token issuance and verification.
///
/// Tokens are self-contained HS256 JWTs carrying the subject (email) and an
/// expiry. Access tokens are never stored server-side; refresh tokens are
/// additionally tracked in the refresh token store so they can be revoked.
/// The signing secret is injected at construction so environments can rotate
/// keys without touching this module.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, Result};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token id; keeps two tokens minted in the same second distinct
    pub jti: String,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a signed token for `subject` expiring after `ttl`.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenSigning(e.to_string()))
    }

    /// Verify signature integrity, then expiry. `jsonwebtoken` checks the
    /// signature before any claim validation, so a forged token is rejected
    /// as `InvalidToken` even when its embedded expiry already passed.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    /// Verify the signature only. Used where a caller must prove possession
    /// of a token we issued without caring whether it has since expired.
    pub fn verify_ignoring_expiry(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-not-for-production";

    #[test]
    fn issue_and_verify_round_trip() {
        let codec = TokenCodec::new(TEST_SECRET);
        let token = codec
            .issue("user@example.com", Duration::minutes(15))
            .unwrap();

        assert_eq!(token.matches('.').count(), 2);

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_tampered_token() {
        let codec = TokenCodec::new(TEST_SECRET);
        let token = codec
            .issue("user@example.com", Duration::minutes(15))
            .unwrap();

        // Flip a character in the payload segment.
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let mut payload: Vec<u8> = parts[1].clone().into_bytes();
        payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();
        let tampered = parts.join(".");

        let err = codec.verify(&tampered).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn rejects_token_signed_with_other_key() {
        let codec = TokenCodec::new(TEST_SECRET);
        let other = TokenCodec::new("a-completely-different-secret");
        let token = other
            .issue("user@example.com", Duration::minutes(15))
            .unwrap();

        let err = codec.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn rejects_expired_token() {
        let codec = TokenCodec::new(TEST_SECRET);
        let token = codec
            .issue("user@example.com", Duration::minutes(-5))
            .unwrap();

        let err = codec.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn forged_token_with_past_expiry_is_invalid_not_expired() {
        let codec = TokenCodec::new(TEST_SECRET);
        let other = TokenCodec::new("a-completely-different-secret");
        let token = other
            .issue("user@example.com", Duration::minutes(-5))
            .unwrap();

        // Signature check comes first: the forgery must not be reported as
        // a mere expiry.
        let err = codec.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn verify_ignoring_expiry_accepts_expired_token() {
        let codec = TokenCodec::new(TEST_SECRET);
        let token = codec
            .issue("user@example.com", Duration::minutes(-5))
            .unwrap();

        let claims = codec.verify_ignoring_expiry(&token).unwrap();
        assert_eq!(claims.sub, "user@example.com");
    }

    #[test]
    fn rejects_malformed_token() {
        let codec = TokenCodec::new(TEST_SECRET);
        assert!(codec.verify("not-a-jwt").is_err());
        assert!(codec.verify("").is_err());
    }
}
