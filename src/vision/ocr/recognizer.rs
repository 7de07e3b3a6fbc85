// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text recognition boundary
//!
//! The request pipeline only ever talks to `TextRecognizer`. The concrete
//! engine (PaddleOCR, or a test double) is injected through the router state.

use async_trait::async_trait;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Bounding box for a detected text region (original image coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One span of text reported for one detected region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Recognized text content
    pub text: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Region location, when the engine reports one
    pub bounding_box: Option<BoundingBox>,
}

impl TextFragment {
    /// Fragment carrying text only
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 1.0,
            bounding_box: None,
        }
    }
}

/// Failures of the recognition engine
#[derive(Debug, Clone, Error)]
pub enum RecognitionError {
    #[error("OCR model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("OCR inference failed: {0}")]
    InferenceFailed(String),

    #[error("OCR recognition timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("OCR worker failed: {0}")]
    WorkerFailed(String),
}

/// Detects and reads text in a preprocessed grayscale image
///
/// Fragments are returned in the engine's reading order.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Engine name for logs
    fn name(&self) -> &str;

    async fn recognize(&self, image: GrayImage) -> Result<Vec<TextFragment>, RecognitionError>;
}
