//! Sliding-window rate limiting over ordered sets.
//!
//! Each guarded operation has a named policy: a key shape, a budget, and a
//! window. Attempts are timestamped members of a per-key ordered set; members
//! older than the window are evicted on every touch and the key's TTL is
//! refreshed to the window length so idle keys expire on their own.
//!
//! The check-then-add sequence is not atomic across callers of the same key.
//! Two concurrent requests can both observe room in the budget and both be
//! admitted; the limiter deliberately errs toward allowing (it is an abuse
//! deterrent, not a hard security boundary). Infrastructure errors propagate
//! as-is and callers should treat them as a denial.
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::storage::KeyValueStore;

const LIMIT_KEY_PREFIX: &str = "auth:limit:";

pub const FAILED_LOGIN_MAX_ATTEMPTS: u32 = 5;
pub const FAILED_LOGIN_WINDOW_MINUTES: i64 = 5;

pub const PASSWORD_CHANGE_MAX_ATTEMPTS: u32 = 2;
pub const PASSWORD_CHANGE_WINDOW_MINUTES: i64 = 24 * 60;

pub const USERNAME_CHANGE_MAX_ATTEMPTS: u32 = 10;
pub const USERNAME_CHANGE_WINDOW_MINUTES: i64 = 60;

pub const TOKEN_REFRESH_MAX_ATTEMPTS: u32 = 10;
pub const TOKEN_REFRESH_WINDOW_MINUTES: i64 = 60;

#[derive(Clone)]
pub struct RateLimiter {
    kv: Arc<dyn KeyValueStore>,
}

impl RateLimiter {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Check the budget for `key` and, when allowed, consume one attempt.
    ///
    /// Returns `(allowed, remaining)`. A rejected attempt is not recorded:
    /// hammering a full window does not push the lockout further out.
    pub async fn check_and_consume(
        &self,
        key: &str,
        max_attempts: u32,
        window_minutes: i64,
    ) -> Result<(bool, u32)> {
        self.check_and_consume_at(key, max_attempts, window_minutes, Utc::now().timestamp())
            .await
    }

    /// [`check_and_consume`](Self::check_and_consume) with the clock supplied
    /// by the caller.
    pub async fn check_and_consume_at(
        &self,
        key: &str,
        max_attempts: u32,
        window_minutes: i64,
        now_ts: i64,
    ) -> Result<(bool, u32)> {
        let window_seconds = window_minutes * 60;
        let window_start = now_ts - window_seconds;

        self.kv.zrem_range_by_score(key, 0, window_start).await?;
        let count = self.kv.zcard(key).await?;

        let decision = if count >= u64::from(max_attempts) {
            (false, 0)
        } else {
            let member = format!("{}:{}", now_ts, Uuid::new_v4());
            self.kv.zadd(key, &member, now_ts).await?;
            (true, max_attempts - count as u32 - 1)
        };

        self.kv.expire(key, window_seconds).await?;
        Ok(decision)
    }

    /// Read-only budget check: evicts expired attempts and counts, but
    /// records nothing. For policies where only failures consume budget.
    pub async fn count_in_window(
        &self,
        key: &str,
        max_attempts: u32,
        window_minutes: i64,
    ) -> Result<(bool, u32)> {
        self.count_in_window_at(key, max_attempts, window_minutes, Utc::now().timestamp())
            .await
    }

    pub async fn count_in_window_at(
        &self,
        key: &str,
        max_attempts: u32,
        window_minutes: i64,
        now_ts: i64,
    ) -> Result<(bool, u32)> {
        let window_seconds = window_minutes * 60;
        let window_start = now_ts - window_seconds;

        self.kv.zrem_range_by_score(key, 0, window_start).await?;
        let count = self.kv.zcard(key).await?;
        self.kv.expire(key, window_seconds).await?;

        let allowed = count < u64::from(max_attempts);
        let remaining = max_attempts.saturating_sub(count as u32);
        Ok((allowed, remaining))
    }

    /// Record one attempt without checking the budget. The counterpart of
    /// [`count_in_window`](Self::count_in_window).
    pub async fn record_attempt(&self, key: &str, window_minutes: i64) -> Result<()> {
        self.record_attempt_at(key, window_minutes, Utc::now().timestamp())
            .await
    }

    pub async fn record_attempt_at(
        &self,
        key: &str,
        window_minutes: i64,
        now_ts: i64,
    ) -> Result<()> {
        let member = format!("{}:{}", now_ts, Uuid::new_v4());
        self.kv.zadd(key, &member, now_ts).await?;
        self.kv.expire(key, window_minutes * 60).await?;
        Ok(())
    }

    /// Login guard, failure-only: call before verifying credentials; a denial
    /// means the account/source pair is locked out. Successful logins never
    /// consume budget - pair with [`record_failed_login`](Self::record_failed_login).
    pub async fn check_login_attempts(
        &self,
        username: &str,
        ip_address: &str,
    ) -> Result<(bool, u32)> {
        self.count_in_window(
            &failed_login_key(username, ip_address),
            FAILED_LOGIN_MAX_ATTEMPTS,
            FAILED_LOGIN_WINDOW_MINUTES,
        )
        .await
    }

    /// Record a failed credential check against the login budget.
    pub async fn record_failed_login(&self, username: &str, ip_address: &str) -> Result<()> {
        self.record_attempt(
            &failed_login_key(username, ip_address),
            FAILED_LOGIN_WINDOW_MINUTES,
        )
        .await
    }

    pub async fn password_change_rate_limit(&self, user_id: Uuid) -> Result<(bool, u32)> {
        let key = format!("{}password_change:{}", LIMIT_KEY_PREFIX, user_id);
        self.check_and_consume(
            &key,
            PASSWORD_CHANGE_MAX_ATTEMPTS,
            PASSWORD_CHANGE_WINDOW_MINUTES,
        )
        .await
    }

    pub async fn username_change_rate_limit(&self, user_id: Uuid) -> Result<(bool, u32)> {
        let key = format!("{}username_change:{}", LIMIT_KEY_PREFIX, user_id);
        self.check_and_consume(
            &key,
            USERNAME_CHANGE_MAX_ATTEMPTS,
            USERNAME_CHANGE_WINDOW_MINUTES,
        )
        .await
    }

    pub async fn refresh_rate_limit_by_ip(&self, ip_address: &str) -> Result<(bool, u32)> {
        let key = format!("{}token_refresh:{}", LIMIT_KEY_PREFIX, ip_address);
        self.check_and_consume(&key, TOKEN_REFRESH_MAX_ATTEMPTS, TOKEN_REFRESH_WINDOW_MINUTES)
            .await
    }
}

fn failed_login_key(username: &str, ip_address: &str) -> String {
    format!("{}failed_login:{}:{}", LIMIT_KEY_PREFIX, username, ip_address)
}
