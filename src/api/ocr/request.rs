// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR upload types and validation

use axum::http::StatusCode;
use axum_extra::extract::multipart::{Multipart, MultipartError};
use tracing::debug;

use crate::api::errors::ApiError;
use crate::vision::MAX_UPLOAD_BYTES;

/// Multipart field name carrying the image
pub const FILE_FIELD: &str = "file";

/// One uploaded file, as received
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Raw file bytes
    pub bytes: Vec<u8>,
    /// Declared content type, if any
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string),
            file_name: None,
        }
    }

    /// Validate the upload before decoding
    pub fn validate(&self) -> Result<(), ApiError> {
        if !is_image_content_type(self.content_type.as_deref()) {
            return Err(ApiError::not_an_image(self.content_type.as_deref()));
        }

        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::too_large(MAX_UPLOAD_BYTES));
        }

        Ok(())
    }
}

/// True for `image/*` content types (case-insensitive)
pub fn is_image_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split('/').next())
        .map(|top| top.trim().eq_ignore_ascii_case("image"))
        .unwrap_or(false)
}

/// Read the image field from a multipart body
///
/// Takes the field named `file`, or failing that the first field with a file
/// name. The content type is checked before the body is read and the size
/// ceiling is enforced while streaming.
pub async fn read_upload(multipart: &mut Multipart) -> Result<UploadedImage, ApiError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let is_file = field.name() == Some(FILE_FIELD) || field.file_name().is_some();
        if !is_file {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        if !is_image_content_type(content_type.as_deref()) {
            return Err(ApiError::not_an_image(content_type.as_deref()));
        }
        let file_name = field.file_name().map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(ApiError::too_large(MAX_UPLOAD_BYTES));
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(
            "Received upload {:?} ({}, {} bytes)",
            file_name,
            content_type.as_deref().unwrap_or("-"),
            bytes.len()
        );

        return Ok(UploadedImage {
            bytes,
            content_type,
            file_name,
        });
    }

    Err(ApiError::file_required())
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::too_large(MAX_UPLOAD_BYTES)
    } else {
        ApiError::ValidationError(format!("invalid multipart body: {}", err.body_text()))
    }
}
