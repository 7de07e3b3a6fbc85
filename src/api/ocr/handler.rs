// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::request::read_upload;
use super::response::OcrResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;

/// POST /ocr - Extract zone / temperature records from an image
///
/// # Request
/// multipart/form-data with one image file in the `file` field
///
/// # Response
/// `{"results": [{"zona": "B12", "valor": "43.5"}, ...]}`
///
/// # Errors
/// - 400 Bad Request: missing file, non-image content type, oversized or undecodable upload
/// - 500 Internal Server Error: OCR engine failure or timeout
pub async fn ocr_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrResponse>, ApiErrorResponse> {
    let request_id = Uuid::new_v4().to_string();
    debug!("OCR request {} received", request_id);

    let result = async {
        let mut multipart = multipart.map_err(|rejection| {
            ApiError::ValidationError(format!("file is required: {}", rejection))
        })?;
        let upload = read_upload(&mut multipart).await?;
        state.pipeline.run(upload).await
    }
    .await;

    match result {
        Ok(records) => Ok(Json(OcrResponse::new(records))),
        Err(e) => {
            warn!("OCR request {} failed: {}", request_id, e);
            Err(e.with_request_id(request_id))
        }
    }
}
