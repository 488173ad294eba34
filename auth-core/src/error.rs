use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("could not validate token")]
    InvalidToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("token has been revoked")]
    TokenRevoked,

    #[error("token is missing a subject claim")]
    MissingSubject,

    #[error("subject not found")]
    SubjectNotFound,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Infrastructure failures (store unreachable, signing misconfigured) as
    /// opposed to domain outcomes. Guarded operations should fail closed when
    /// this returns true.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuthError::Database(_) | AuthError::Redis(_) | AuthError::Token(_)
        )
    }
}
