//! In-memory store implementations and fixtures for exercising the token
//! core without Postgres or Redis.
#![allow(dead_code)] // each test binary uses its own subset of these helpers

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use auth_core::config::JwtConfig;
use auth_core::error::Result;
use auth_core::models::{RefreshToken, User};
use auth_core::security::jwt::TokenCodec;
use auth_core::storage::{KeyValueStore, RefreshTokenStore, UserStore};
use auth_core::TokenService;

pub const TEST_SECRET: &str = "integration-test-signing-secret";

#[derive(Default)]
struct KvEntry {
    value: Option<String>,
    zset: HashMap<String, i64>,
    ttl_seconds: Option<i64>,
}

/// Key-value store double with just enough ordered-set semantics for the
/// limiter: like Redis, a key whose last member is removed disappears.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, KvEntry>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// TTL recorded by the last `set_ex`/`expire` on `key`.
    pub fn ttl_of(&self, key: &str) -> Option<i64> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .and_then(|e| e.ttl_seconds)
    }

    pub fn key_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .and_then(|e| e.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.entry(key.to_string()).or_default();
        entry.value = Some(value.to_string());
        entry.ttl_seconds = Some(ttl_seconds as i64);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().unwrap().contains_key(key))
    }

    async fn zadd(&self, key: &str, member: &str, score: i64) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.entry(key.to_string()).or_default();
        entry.zset.insert(member.to_string(), score);
        Ok(())
    }

    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> Result<u64> {
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.get_mut(key) else {
            return Ok(0);
        };

        let before = entry.zset.len();
        entry.zset.retain(|_, score| *score < min || *score > max);
        let removed = (before - entry.zset.len()) as u64;

        if entry.zset.is_empty() && entry.value.is_none() {
            entries.remove(key);
        }
        Ok(removed)
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .map(|e| e.zset.len() as u64)
            .unwrap_or(0))
    }

    async fn expire(&self, key: &str, ttl_seconds: i64) -> Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.ttl_seconds = Some(ttl_seconds);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    rows: Mutex<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn create(&self, token: &RefreshToken) -> Result<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        Ok(self.rows.lock().unwrap().get(token).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>> {
        let mut rows: Vec<RefreshToken> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.created_at);
        Ok(rows)
    }

    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<()> {
        if let Some(row) = self.rows.lock().unwrap().get_mut(token) {
            if !row.revoked {
                row.revoked = true;
                row.revoked_at = Some(now);
            }
        }
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64> {
        let mut revoked = 0;
        for row in self.rows.lock().unwrap().values_mut() {
            if row.user_id == user_id && !row.revoked {
                row.revoked = true;
                row.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, row| row.expires_at >= now);
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn remove(&self, id: Uuid) {
        self.users.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        algorithm: "HS256".to_string(),
        access_token_ttl_minutes: 30,
        refresh_token_ttl_days: 7,
        blacklist_fallback_ttl_secs: 1800,
    }
}

pub fn codec() -> TokenCodec {
    TokenCodec::new(&jwt_config()).expect("codec from test config")
}

pub struct TestBackend {
    pub service: TokenService,
    pub refresh: Arc<InMemoryRefreshTokenStore>,
    pub users: Arc<InMemoryUserStore>,
    pub kv: Arc<InMemoryKeyValueStore>,
}

pub fn backend() -> TestBackend {
    let refresh = Arc::new(InMemoryRefreshTokenStore::new());
    let users = Arc::new(InMemoryUserStore::new());
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let config = jwt_config();

    let service = TokenService::new(
        codec(),
        refresh.clone(),
        users.clone(),
        kv.clone(),
        config.blacklist_fallback_ttl_secs,
    );

    TestBackend {
        service,
        refresh,
        users,
        kv,
    }
}

pub fn seed_user(backend: &TestBackend) -> User {
    let user = User {
        id: Uuid::new_v4(),
        username: format!("user-{}", Uuid::new_v4().simple()),
        email: format!("{}@example.com", Uuid::new_v4().simple()),
        created_at: Utc::now(),
    };
    backend.users.insert(user.clone());
    user
}
