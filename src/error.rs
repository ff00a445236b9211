//! Error types for the LLM proxy
//!
//! This module defines the client-facing error type. Every variant maps to a
//! status code and the flat `{"error": ..., "message": ...}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::proxy::{ForwardError, RegistryError};

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Provider not specified")]
    MissingProvider,

    #[error("unsupported provider: {0}")]
    ProviderNotFound(String),

    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("{0}")]
    InvalidRequestBody(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    /// Status code and error category for this error
    pub fn status_and_category(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::MissingProvider => (StatusCode::BAD_REQUEST, "Invalid path"),
            AppError::ProviderNotFound(_) => (StatusCode::NOT_FOUND, "Provider not found"),
            AppError::RouteNotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            AppError::InvalidRequestBody(_) => (StatusCode::BAD_REQUEST, "Invalid request body"),
            AppError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "Bad Gateway"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownProvider(name) => AppError::ProviderNotFound(name),
            other @ RegistryError::InvalidBaseUrl { .. } => AppError::Internal(other.into()),
        }
    }
}

impl From<ForwardError> for AppError {
    fn from(err: ForwardError) -> Self {
        match err {
            ForwardError::RequestBody(_) => AppError::InvalidRequestBody(err.to_string()),
            ForwardError::InvalidTarget(_) | ForwardError::Dispatch { .. } => {
                AppError::BadGateway(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, category) = self.status_and_category();

        let message = match &self {
            // Internal details stay in the logs
            AppError::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: category.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
