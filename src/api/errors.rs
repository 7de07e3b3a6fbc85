// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vision::{ImageError, RecognitionError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Failures surfaced by the OCR endpoint
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Client sent a missing, non-image, or oversized upload
    #[error("{0}")]
    ValidationError(String),

    /// Upload could not be decoded as an image
    #[error("{0}")]
    DecodeError(String),

    /// The OCR engine failed or timed out
    #[error("{0}")]
    RecognitionError(String),
}

impl ApiError {
    pub fn file_required() -> Self {
        ApiError::ValidationError("file is required".to_string())
    }

    pub fn not_an_image(content_type: Option<&str>) -> Self {
        ApiError::ValidationError(format!(
            "uploaded file is not an image (content type: {})",
            content_type.unwrap_or("missing")
        ))
    }

    pub fn too_large(limit: usize) -> Self {
        ApiError::ValidationError(format!(
            "uploaded file is too large (max {} bytes)",
            limit
        ))
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "validation_error",
            ApiError::DecodeError(_) => "decode_error",
            ApiError::RecognitionError(_) => "recognition_error",
        }
    }

    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        ErrorResponse {
            detail: self.to_string(),
            error_type: self.error_type().to_string(),
            request_id,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) | ApiError::DecodeError(_) => 400,
            ApiError::RecognitionError(_) => 500,
        }
    }

    /// Attach a request id and render as an HTTP response
    pub fn with_request_id(self, request_id: impl Into<String>) -> ApiErrorResponse {
        ApiErrorResponse {
            error: self,
            request_id: Some(request_id.into()),
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::TooLarge(_, limit) => ApiError::too_large(limit),
            other => ApiError::DecodeError(format!("cannot open image: {}", other)),
        }
    }
}

impl From<RecognitionError> for ApiError {
    fn from(err: RecognitionError) -> Self {
        ApiError::RecognitionError(err.to_string())
    }
}

/// Error response wrapper
#[derive(Debug)]
pub struct ApiErrorResponse {
    pub error: ApiError,
    pub request_id: Option<String>,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = self.error.to_response(self.request_id);

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiErrorResponse {
            error: self,
            request_id: None,
        }
        .into_response()
    }
}
