use crate::ingestion::IngestionError;
use thiserror::Error;

/// Domain error taxonomy. Every operation raises one of these at the point of
/// detection and the HTTP layer maps each variant to a status code and a
/// fixed user-facing message.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("user not found")]
    UserNotFound,

    #[error("book not found")]
    BookNotFound,

    #[error("image not found")]
    ImageNotFound,

    #[error("requester is not the book owner")]
    Unauthorized,

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("login id already in use")]
    DuplicateLogin,

    #[error("book already has an image")]
    ImageAlreadyExists,

    #[error("wrong login id or password")]
    BadCredentials,

    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Internal(err.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
