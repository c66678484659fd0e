//! # ApiError
//!
//! Maps service failures onto HTTP responses.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use domains::AppError;
use thiserror::Error;

use crate::views::NotFoundPage;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Rendered as the not-found page.
    #[error("{0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(..) => ApiError::NotFound(err.to_string()),
            AppError::UnknownAnimal(_) | AppError::ValidationError(_) => {
                ApiError::BadRequest(err.to_string())
            }
            AppError::UploadFailure(_) | AppError::Internal(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        ApiError::Internal(format!("template rendering failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let page = NotFoundPage {
                    title: "Not Found",
                    message,
                };
                match page.render() {
                    Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
                    Err(_) => StatusCode::NOT_FOUND.into_response(),
                }
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
