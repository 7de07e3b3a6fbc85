// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR pipeline: detection, cropping, recognition

use anyhow::Result;
use async_trait::async_trait;
use image::{imageops, GrayImage};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use super::detection::{OcrDetectionModel, DEFAULT_DETECTION_THRESHOLD};
use super::preprocessing::{preprocess_for_detection, preprocess_for_recognition};
use super::recognition::OcrRecognitionModel;
use super::recognizer::{BoundingBox, RecognitionError, TextFragment, TextRecognizer};

/// Detection model file name inside the model directory
pub const DETECTION_MODEL_FILE: &str = "det_model.onnx";

/// Recognition model file name inside the model directory
pub const RECOGNITION_MODEL_FILE: &str = "rec_model.onnx";

/// English character dictionary file name
pub const ENGLISH_DICTIONARY_FILE: &str = "en_dict.txt";

/// Only English models are shipped
pub const SUPPORTED_LANGUAGES: &[&str] = &["en"];

/// Pixels added around each detected box before cropping
const CROP_MARGIN: u32 = 2;

/// Configuration for loading the PaddleOCR models
#[derive(Debug, Clone)]
pub struct OcrModelConfig {
    /// Directory holding the model and dictionary files
    pub model_dir: PathBuf,
    /// Recognition language
    pub language: String,
    /// ONNX Runtime intra-op threads per session
    pub intra_threads: usize,
    /// Probability threshold for text pixels
    pub detection_threshold: f32,
}

impl Default for OcrModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./models/paddleocr-onnx"),
            language: "en".to_string(),
            intra_threads: 4,
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
        }
    }
}

impl OcrModelConfig {
    pub fn detection_model_path(&self) -> PathBuf {
        self.model_dir.join(DETECTION_MODEL_FILE)
    }

    pub fn recognition_model_path(&self) -> PathBuf {
        self.model_dir.join(RECOGNITION_MODEL_FILE)
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.model_dir.join(ENGLISH_DICTIONARY_FILE)
    }
}

/// PaddleOCR model for text extraction
///
/// Combines text detection and recognition on CPU. Inference on each model is
/// serialized by its session lock.
#[derive(Debug, Clone)]
pub struct PaddleOcrModel {
    detection: OcrDetectionModel,
    recognition: OcrRecognitionModel,
    model_dir: PathBuf,
}

impl PaddleOcrModel {
    /// Load PaddleOCR models from the configured directory
    ///
    /// Expected files:
    /// - det_model.onnx (text detection)
    /// - rec_model.onnx (text recognition)
    /// - en_dict.txt (character dictionary)
    pub fn new(config: &OcrModelConfig) -> Result<Self> {
        if !SUPPORTED_LANGUAGES.contains(&config.language.as_str()) {
            anyhow::bail!(
                "unsupported OCR language '{}', supported: {:?}",
                config.language,
                SUPPORTED_LANGUAGES
            );
        }

        debug!("Loading PaddleOCR models from {}", config.model_dir.display());

        let detection = OcrDetectionModel::new(config.detection_model_path(), config.intra_threads)?
            .with_threshold(config.detection_threshold);
        let recognition = OcrRecognitionModel::new(
            config.recognition_model_path(),
            config.dictionary_path(),
            config.intra_threads,
        )?;

        info!(
            "✅ PaddleOCR models loaded from {} (CPU-only)",
            config.model_dir.display()
        );

        Ok(Self {
            detection,
            recognition,
            model_dir: config.model_dir.clone(),
        })
    }

    /// Load on a blocking thread, mapping failures to `RecognitionError`
    pub async fn load(config: OcrModelConfig) -> Result<Self, RecognitionError> {
        tokio::task::spawn_blocking(move || Self::new(&config))
            .await
            .map_err(|e| RecognitionError::WorkerFailed(e.to_string()))?
            .map_err(|e| RecognitionError::ModelUnavailable(format!("{:#}", e)))
    }

    /// Detect and read every text region, in reading order
    pub fn process(&self, image: &GrayImage) -> Result<Vec<TextFragment>> {
        let start = Instant::now();

        let (tensor, info) = preprocess_for_detection(image);
        let boxes = self.detection.detect(&tensor)?;

        let mut fragments = Vec::with_capacity(boxes.len());
        for text_box in boxes.iter().filter(|b| b.is_valid()) {
            let (x0, y0) = info.map_to_original(text_box.x, text_box.y);
            let (x1, y1) = info.map_to_original(
                text_box.x + text_box.width,
                text_box.y + text_box.height,
            );

            let Some(bounding_box) = crop_bounds(x0, y0, x1, y1, image.width(), image.height())
            else {
                continue;
            };

            let crop = imageops::crop_imm(
                image,
                bounding_box.x,
                bounding_box.y,
                bounding_box.width,
                bounding_box.height,
            )
            .to_image();

            let recognized = self
                .recognition
                .recognize(&preprocess_for_recognition(&crop))?;
            if recognized.is_empty() {
                continue;
            }

            fragments.push(TextFragment {
                text: recognized.text,
                confidence: recognized.confidence,
                bounding_box: Some(bounding_box),
            });
        }

        debug!(
            "PaddleOCR read {} of {} regions from {} in {}ms",
            fragments.len(),
            boxes.len(),
            self.model_dir.display(),
            start.elapsed().as_millis()
        );

        Ok(fragments)
    }
}

/// Pad a box by `CROP_MARGIN` and clamp it to the image
fn crop_bounds(x0: f32, y0: f32, x1: f32, y1: f32, width: u32, height: u32) -> Option<BoundingBox> {
    let left = (x0.floor() as u32).saturating_sub(CROP_MARGIN);
    let top = (y0.floor() as u32).saturating_sub(CROP_MARGIN);
    let right = ((x1.ceil() as u32) + CROP_MARGIN).min(width);
    let bottom = ((y1.ceil() as u32) + CROP_MARGIN).min(height);

    if right <= left || bottom <= top {
        return None;
    }

    Some(BoundingBox {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    })
}

#[async_trait]
impl TextRecognizer for PaddleOcrModel {
    fn name(&self) -> &str {
        "paddleocr"
    }

    async fn recognize(&self, image: GrayImage) -> Result<Vec<TextFragment>, RecognitionError> {
        let model = self.clone();
        tokio::task::spawn_blocking(move || model.process(&image))
            .await
            .map_err(|e| RecognitionError::WorkerFailed(e.to_string()))?
            .map_err(|e| RecognitionError::InferenceFailed(format!("{:#}", e)))
    }
}
