//! Access token blacklist key and TTL derivation.
//!
//! Blacklisting invalidates an access token before its natural expiry
//! (logout). Entries carry a TTL equal to the token's remaining lifetime, so
//! blacklist storage never outgrows the access-token window.
use sha2::{Digest, Sha256};

const BLACKLIST_KEY_PREFIX: &str = "auth:revoked:token:";

/// Entry lifetime for a token that is already past its expiry when
/// blacklisted; covers clock skew between this host and token consumers.
const EXPIRED_TOKEN_GRACE_SECS: u64 = 300;

/// Blacklist key for an access token. Raw bearer tokens are never written to
/// the key-value store; only their hash is.
pub fn blacklist_key(token: &str) -> String {
    format!("{}{}", BLACKLIST_KEY_PREFIX, sha256_hash(token))
}

/// TTL for a blacklist entry: the token's remaining lifetime, a short grace
/// period when it has already expired, or `fallback_ttl_secs` when the token
/// carries no expiry claim.
pub fn blacklist_ttl(expires_at_secs: Option<i64>, now_secs: i64, fallback_ttl_secs: u64) -> u64 {
    match expires_at_secs {
        Some(exp) if exp > now_secs => (exp - now_secs) as u64,
        Some(_) => EXPIRED_TOKEN_GRACE_SECS,
        None => fallback_ttl_secs,
    }
}

fn sha256_hash(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
