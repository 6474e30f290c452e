use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use thiserror::Error;

use crate::external::prediction_source::PredictionSourceError;

/// Message shown to the user for every failed fetch, whatever the cause.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch prediction";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Prediction fetch error: {0}")]
    Fetch(#[from] PredictionSourceError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Premium access required")]
    Forbidden,
    #[error("Widget has been unmounted")]
    Gone,
}

/// The two failure classes a fetch can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    FetchFailure,
    ValidationFailure,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::ValidationFailure,
            _ => ErrorKind::FetchFailure,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Premium access required").into_response(),
            AppError::Gone => (StatusCode::GONE, "Widget has been unmounted").into_response(),
            AppError::Validation(_) | AppError::Fetch(_) => {
                (StatusCode::BAD_GATEWAY, FETCH_FAILED_MESSAGE).into_response()
            }
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response(),
        }
    }
}
