//! Mapping of domain errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::BlogError;

/// Handler error: a [`BlogError`] rendered as `{ "error": ... }`
#[derive(Debug)]
pub struct AppError(pub BlogError);

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            BlogError::NotFound { .. } => StatusCode::NOT_FOUND,
            BlogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BlogError::SlugTaken(_) => StatusCode::CONFLICT,
        }
    }
}

impl From<BlogError> for AppError {
    fn from(err: BlogError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!("Request failed with {}: {}", status, self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
