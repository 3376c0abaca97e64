/// Session orchestration: the token rotation protocol.
///
/// Every successful register/login/refresh issues a fresh access/refresh
/// pair and records the refresh token in the store; refresh consumes the
/// presented token atomically so it can be redeemed exactly once. The
/// service holds no mutable state of its own — all shared state lives in the
/// refresh token store.
use std::sync::Arc;

use chrono::Duration;

use crate::clients::UserDirectory;
use crate::error::{AuthError, Result};
use crate::models::{LoginRequest, RegisterRequest, TokenPair};
use crate::security::jwt::TokenCodec;
use crate::security::password;
use crate::store::RefreshTokenStore;

pub const REFRESH_COOKIE: &str = "refresh_token";

pub fn access_token_ttl() -> Duration {
    Duration::minutes(15)
}

pub fn refresh_token_ttl() -> Duration {
    Duration::days(7)
}

pub struct SessionService {
    codec: TokenCodec,
    store: Arc<dyn RefreshTokenStore>,
    users: Arc<dyn UserDirectory>,
}

impl SessionService {
    pub fn new(
        codec: TokenCodec,
        store: Arc<dyn RefreshTokenStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            codec,
            store,
            users,
        }
    }

    /// Register a new user, then start a session for them. User creation
    /// must complete before any credential is issued; a directory failure
    /// leaves no session state behind.
    pub async fn register(&self, registration: &RegisterRequest) -> Result<TokenPair> {
        self.users.create_user(registration).await?;

        tracing::info!("user registered: {}", registration.email);
        self.issue_session(&registration.email).await
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<TokenPair> {
        let user = self
            .users
            .find_by_email(&credentials.email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        password::verify_password(&credentials.password, &user.password)?;

        tracing::info!("user logged in: {}", user.email);
        self.issue_session(&user.email).await
    }

    /// Redeem a refresh token for a fresh pair. The store is authoritative:
    /// presence there means the token was issued here and has not been
    /// revoked or expired, so the embedded expiry is not re-checked. The
    /// presented access token must carry our signature (expiry ignored) and
    /// name the same subject, which blocks mixing credentials from two
    /// different sessions.
    pub async fn refresh(&self, access_token: &str, refresh_token: &str) -> Result<TokenPair> {
        let access_claims = self
            .codec
            .verify_ignoring_expiry(access_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        // Consuming the entry before issuing a replacement is what makes
        // refresh single-use: a concurrent duplicate observes the key as
        // already gone.
        let subject = self
            .store
            .take(refresh_token)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if access_claims.sub != subject {
            tracing::warn!("refresh rejected: access token subject mismatch");
            return Err(AuthError::InvalidRefreshToken);
        }

        tracing::info!("session refreshed: {}", subject);
        self.issue_session(&subject).await
    }

    /// Best-effort revocation; never fails the caller. A store error only
    /// means the entry falls back to expiring on its own TTL.
    pub async fn logout(&self, refresh_token: &str) {
        if let Err(e) = self.store.delete(refresh_token).await {
            tracing::warn!("failed to evict refresh token on logout: {}", e);
        } else {
            tracing::info!("session logged out");
        }
    }

    /// Shared issue step: sign both tokens, then record the refresh token
    /// with a TTL matching its embedded expiry. Any failure issues nothing.
    async fn issue_session(&self, subject: &str) -> Result<TokenPair> {
        let access_token = self.codec.issue(subject, access_token_ttl())?;
        let refresh_token = self.codec.issue(subject, refresh_token_ttl())?;

        self.store
            .put(&refresh_token, subject, refresh_token_ttl())
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
