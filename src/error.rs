use thiserror::Error;

/// Errors raised below the route layer.
///
/// Nothing in here ever reaches a client directly: route handlers convert
/// `BadRequest` into an inline form error and everything else into a
/// logged, generic failure message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("server error: {0}")]
    Server(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<surrealdb::Error> for ApiError {
    fn from(err: surrealdb::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}
