// errors.rs
use thiserror::Error;

/// Errors surfaced to HTTP clients. Engine lookups never fail on bad data;
/// these cover routing, request decoding and batch limits.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Batch of {count} items exceeds the limit of {max}")]
    PayloadTooLarge { count: usize, max: usize },

    #[error("Request body exceeds {max} bytes")]
    BodyTooLarge { max: u64 },

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::PayloadTooLarge { .. } | ServerError::BodyTooLarge { .. } => 413,
            ServerError::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code for the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::NotFound => "not_found",
            ServerError::BadRequest(_) => "bad_request",
            ServerError::PayloadTooLarge { .. } | ServerError::BodyTooLarge { .. } => {
                "payload_too_large"
            }
            ServerError::Internal(_) => "internal",
        }
    }
}

impl From<crate::engine::EngineError> for ServerError {
    fn from(err: crate::engine::EngineError) -> Self {
        match err {
            crate::engine::EngineError::TooManyItems { count, max } => {
                ServerError::PayloadTooLarge { count, max }
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}
