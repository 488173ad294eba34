pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod security;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AuthError, Result};
pub use security::jwt::TokenCodec;
pub use services::rate_limiter::RateLimiter;
pub use services::token_service::{IssuedTokens, TokenService};
