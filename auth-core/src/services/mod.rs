pub mod rate_limiter;
pub mod token_service;
