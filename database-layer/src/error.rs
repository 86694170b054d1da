use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Referenced entity does not exist: {0}")]
    MissingReference(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Stored data is invalid: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
