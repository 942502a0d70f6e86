use actix_web::{
    error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse, ResponseError,
};
use database::database::database::DatabaseError;
use serde_json::json;
use thiserror::Error;

pub const PERSON_NOT_FOUND: &str = "Person not found";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Any schema violation, all of them share a single status
    #[error("{0}")]
    Validation(String),

    #[error("{}", PERSON_NOT_FOUND)]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    StorageUnavailable(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

impl From<DatabaseError> for ApiError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(_) => ApiError::NotFound,
            DatabaseError::NotNullConstraintViolation(field) => {
                ApiError::Validation(format!("Cannot set field to null: {}", field))
            }
            DatabaseError::AlreadyExists(id) => {
                ApiError::Conflict(format!("Person already exists: {}", id))
            }
            DatabaseError::StorageUnavailable(e) => {
                log::error!("Storage failure: {}", e);
                ApiError::StorageUnavailable(e.to_string())
            }
        }
    }
}

/// Routes body extraction failures (bad JSON, wrong types, missing fields, wrong content type)
/// into the uniform validation outcome
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(error.to_string()).into()
}
