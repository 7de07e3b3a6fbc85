// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR integration for text extraction from images
//!
//! This module provides CPU-based OCR using PaddleOCR ONNX models.
//!
//! Components:
//! - `recognizer` - The `TextRecognizer` boundary used by the request pipeline
//! - `detection` - Text region detection
//! - `recognition` - Text recognition from detected regions
//! - `preprocessing` - Tensor preparation for both models
//! - `model` - Combined OCR engine
//! - `lazy` - First-use construction of an engine

pub mod detection;
pub mod lazy;
pub mod model;
pub mod preprocessing;
pub mod recognition;
pub mod recognizer;

pub use detection::{OcrDetectionModel, TextBox};
pub use lazy::LazyRecognizer;
pub use model::{OcrModelConfig, PaddleOcrModel};
pub use recognition::{CharDictionary, OcrRecognitionModel, RecognizedText};
pub use recognizer::{BoundingBox, RecognitionError, TextFragment, TextRecognizer};
