use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Password does not meet policy: {0}")]
    WeakPassword(String),

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Password hashing timed out")]
    HashingTimeout,

    #[error("JWT error: {0}")]
    JwtError(String),
}

pub type Result<T> = std::result::Result<T, IdentityError>;
