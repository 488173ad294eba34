//! Token lifecycle manager: issuance, rotation with reuse detection,
//! revocation, and the access-token blacklist.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::{RefreshToken, User};
use crate::security::jwt::TokenCodec;
use crate::security::token_revocation::{blacklist_key, blacklist_ttl};
use crate::storage::{KeyValueStore, RefreshTokenStore, UserStore};

/// The pair handed back to the caller on login or rotation.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenService {
    codec: TokenCodec,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    users: Arc<dyn UserStore>,
    kv: Arc<dyn KeyValueStore>,
    blacklist_fallback_ttl_secs: u64,
}

impl TokenService {
    pub fn new(
        codec: TokenCodec,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        users: Arc<dyn UserStore>,
        kv: Arc<dyn KeyValueStore>,
        blacklist_fallback_ttl_secs: u64,
    ) -> Self {
        Self {
            codec,
            refresh_tokens,
            users,
            kv,
            blacklist_fallback_ttl_secs,
        }
    }

    /// Issue a fresh access token and refresh token for `user_id`.
    ///
    /// Unless `skip_revocation` is set, every refresh token the subject still
    /// holds is revoked first - one login, one live session. `skip_revocation`
    /// is for registration and first login, where no prior session can exist
    /// and the extra write would be wasted.
    pub async fn issue_tokens(&self, user_id: Uuid, skip_revocation: bool) -> Result<IssuedTokens> {
        let now = Utc::now();

        if !skip_revocation {
            self.refresh_tokens.revoke_all_for_user(user_id, now).await?;
        }

        self.mint(user_id, now).await
    }

    /// Exchange a refresh token for a new token pair, burning the old one.
    ///
    /// A refresh token that comes back already revoked means the value was
    /// used twice - someone replayed it. The response is to revoke every
    /// refresh token the subject holds before failing: the thief's token is
    /// burned and the legitimate holder has to re-authenticate.
    pub async fn rotate_refresh_token(&self, refresh_token_value: &str) -> Result<IssuedTokens> {
        let row = self
            .refresh_tokens
            .find_by_token(refresh_token_value)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let now = Utc::now();

        if row.is_expired(now) {
            return Err(AuthError::TokenExpired);
        }

        if row.revoked {
            let revoked = self
                .refresh_tokens
                .revoke_all_for_user(row.user_id, now)
                .await?;
            tracing::warn!(
                "Refresh token reuse detected for user {}; revoked {} remaining sessions",
                row.user_id,
                revoked
            );
            return Err(AuthError::TokenRevoked);
        }

        let user = self
            .users
            .find_by_id(row.user_id)
            .await?
            .ok_or(AuthError::SubjectNotFound)?;

        self.refresh_tokens.revoke(refresh_token_value, now).await?;

        self.mint(user.id, now).await
    }

    /// Mark a refresh token revoked. Silently succeeds when the value is
    /// unknown or already revoked - logout must not fail on a stale cookie.
    pub async fn revoke_refresh_token(&self, refresh_token_value: &str) -> Result<()> {
        self.refresh_tokens
            .revoke(refresh_token_value, Utc::now())
            .await
    }

    /// Invalidate an access token ahead of its natural expiry.
    ///
    /// The entry's TTL is the token's remaining lifetime, so the blacklist
    /// never holds more than one access-token window of entries. A token that
    /// fails signature verification is ignored: it can never authenticate, so
    /// there is nothing to deny.
    pub async fn blacklist_access_token(&self, access_token: &str) -> Result<()> {
        let exp = match self.codec.decode_expiry(access_token) {
            Ok(exp) => exp,
            Err(_) => return Ok(()),
        };

        let now = Utc::now().timestamp();
        let ttl = blacklist_ttl(exp, now, self.blacklist_fallback_ttl_secs);

        self.kv
            .set_ex(&blacklist_key(access_token), "1", ttl)
            .await?;

        tracing::info!("Access token blacklisted; entry expires in {} seconds", ttl);
        Ok(())
    }

    pub async fn is_access_token_blacklisted(&self, access_token: &str) -> Result<bool> {
        self.kv.exists(&blacklist_key(access_token)).await
    }

    /// Resolve a bearer access token to its user: not blacklisted, signature
    /// and expiry valid, subject present and still existing.
    pub async fn authenticate_access_token(&self, access_token: &str) -> Result<User> {
        if self.is_access_token_blacklisted(access_token).await? {
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.codec.decode(access_token)?;
        let user_id = claims.subject_id()?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::SubjectNotFound)
    }

    /// Drop refresh token rows past their expiry. Intended for a periodic
    /// sweep; rotation and validation never depend on it.
    pub async fn delete_expired_refresh_tokens(&self) -> Result<u64> {
        self.refresh_tokens.delete_expired(Utc::now()).await
    }

    async fn mint(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<IssuedTokens> {
        let access_token = self.codec.issue_access_token(user_id)?;
        let (refresh_value, expires_at) = self.codec.issue_refresh_secret();

        let row = RefreshToken {
            id: Uuid::new_v4(),
            token: refresh_value.clone(),
            user_id,
            expires_at,
            revoked: false,
            revoked_at: None,
            created_at: now,
        };
        self.refresh_tokens.create(&row).await?;

        Ok(IssuedTokens {
            access_token,
            refresh_token: refresh_value,
            refresh_expires_at: expires_at,
        })
    }
}
