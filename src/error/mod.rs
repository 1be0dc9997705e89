use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("Completion unavailable: {0}")]
    CompletionUnavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let error = ErrorResponse {
            error: self.to_string(),
        };

        match self {
            ApiError::InvalidInput(_) => HttpResponse::BadRequest().json(error),
            ApiError::NotFound(_) => HttpResponse::NotFound().json(error),
            ApiError::RetrievalUnavailable(_) | ApiError::CompletionUnavailable(_) => {
                HttpResponse::ServiceUnavailable().json(error)
            }
            _ => HttpResponse::InternalServerError().json(error),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<actix_multipart::MultipartError> for ApiError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

/// Result of an operation that may have fallen back to a simpler path.
///
/// Recoverable collaborator failures (vector index down, model quota) degrade
/// rather than fail the request; call sites must be able to tell a degraded
/// value apart from a fully trustworthy one.
#[derive(Debug, Clone, PartialEq)]
pub enum Degradable<T> {
    Full(T),
    Degraded(T, String),
}

impl<T> Degradable<T> {
    pub fn value(&self) -> &T {
        match self {
            Degradable::Full(v) | Degradable::Degraded(v, _) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Degradable::Full(v) | Degradable::Degraded(v, _) => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Degradable::Degraded(_, _))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degradable_exposes_value_and_flag() {
        let full = Degradable::Full(vec![1, 2]);
        assert!(!full.is_degraded());
        assert_eq!(full.value().len(), 2);

        let degraded = Degradable::Degraded(Vec::<i32>::new(), "index down".into());
        assert!(degraded.is_degraded());
        assert!(degraded.into_value().is_empty());
    }

    #[test]
    fn unavailable_errors_map_to_service_unavailable() {
        let err = ApiError::RetrievalUnavailable("chromadb unreachable".into());
        assert_eq!(err.error_response().status(), 503);

        let err = ApiError::InvalidInput("empty message".into());
        assert_eq!(err.error_response().status(), 400);
    }
}
