//! Maps engine errors onto HTTP responses.

use crate::engine::error::{ArchiveError, BatchError, MappingError, TableError, TemplateError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("upload exceeds the limit of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("{0} not found")]
    NotFound(String),

    #[error("job {0} has not finished yet")]
    NotFinished(String),

    #[error("the results of job {0} are no longer kept")]
    Released(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Template(_) | ApiError::Table(_) | ApiError::Upload(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Mapping(MappingError::SingleTemplateMode) => StatusCode::CONFLICT,
            ApiError::Mapping(_) => StatusCode::BAD_REQUEST,
            ApiError::Batch(_) | ApiError::NotFinished(_) => StatusCode::CONFLICT,
            ApiError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Released(_) => StatusCode::GONE,
            ApiError::Archive(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}
