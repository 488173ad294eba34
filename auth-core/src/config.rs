use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,

    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: String,

    #[serde(default = "default_access_token_ttl_minutes")]
    pub access_token_ttl_minutes: i64,

    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,

    #[serde(default = "default_blacklist_fallback_ttl_secs")]
    pub blacklist_fallback_ttl_secs: u64,
}

// Default value functions
fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_token_ttl_minutes() -> i64 {
    30
}

fn default_refresh_token_ttl_days() -> i64 {
    7
}

fn default_blacklist_fallback_ttl_secs() -> u64 {
    1800
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            algorithm: env::var("JWT_ALGORITHM").unwrap_or_else(|_| default_jwt_algorithm()),
            access_token_ttl_minutes: env::var("JWT_ACCESS_TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| default_access_token_ttl_minutes().to_string())
                .parse()
                .unwrap_or(default_access_token_ttl_minutes()),
            refresh_token_ttl_days: env::var("JWT_REFRESH_TOKEN_TTL_DAYS")
                .unwrap_or_else(|_| default_refresh_token_ttl_days().to_string())
                .parse()
                .unwrap_or(default_refresh_token_ttl_days()),
            blacklist_fallback_ttl_secs: env::var("JWT_BLACKLIST_FALLBACK_TTL_SECS")
                .unwrap_or_else(|_| default_blacklist_fallback_ttl_secs().to_string())
                .parse()
                .unwrap_or(default_blacklist_fallback_ttl_secs()),
        };

        Config { jwt }
    }
}
