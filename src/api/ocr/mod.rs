// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR API endpoint module
//!
//! Provides POST /ocr for extracting zone / temperature records from images.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::ocr_handler;
pub use request::{is_image_content_type, read_upload, UploadedImage, FILE_FIELD};
pub use response::OcrResponse;
