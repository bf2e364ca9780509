// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::directory::DirectoryError;

/// Message used for every failure that is not the client's fault nor a
/// directory status error
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Malformed or missing client input
    ValidationError(String),
    /// The user directory answered with a non-success status
    UpstreamError { status: u16, message: String },
    InternalError,
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::ValidationError(msg) => msg.clone(),
            ApiError::UpstreamError { message, .. } => message.clone(),
            ApiError::InternalError => INTERNAL_ERROR_MESSAGE.to_string(),
        };

        ErrorResponse { error }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) => 400,
            ApiError::UpstreamError { .. } | ApiError::InternalError => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::UpstreamError { status, message } => {
                write!(f, "Upstream error ({}): {}", status, message)
            }
            ApiError::InternalError => write!(f, "{}", INTERNAL_ERROR_MESSAGE),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Proxy(proxy) => ApiError::UpstreamError {
                status: proxy.status,
                message: proxy.message,
            },
            DirectoryError::Transport(_) | DirectoryError::InvalidBody(_) => {
                ApiError::InternalError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
