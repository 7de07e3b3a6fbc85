// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Upload decoding with size and format checks
//! - Contrast enhancement and denoising ahead of OCR
//! - OCR (Optical Character Recognition) via PaddleOCR

pub mod enhance;
pub mod image_utils;
pub mod ocr;

pub use enhance::preprocess;
pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo, MAX_UPLOAD_BYTES};
pub use ocr::{LazyRecognizer, OcrModelConfig, PaddleOcrModel, RecognitionError, TextFragment, TextRecognizer};
