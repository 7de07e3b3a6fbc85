// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request pipeline: validate, decode, enhance, recognize, extract

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::api::errors::ApiError;
use crate::api::ocr::UploadedImage;
use crate::config::{InitPolicy, ServiceConfig};
use crate::extraction::{ExtractedRecord, FragmentParser};
use crate::vision::{
    decode_image_bytes, enhance, LazyRecognizer, PaddleOcrModel, RecognitionError, TextRecognizer,
};

/// Default bound on a single recognition call
pub const DEFAULT_RECOGNITION_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one upload through the OCR stages
///
/// The recognizer is shared process-wide; everything else is per request.
#[derive(Clone)]
pub struct OcrPipeline {
    recognizer: Arc<dyn TextRecognizer>,
    parser: FragmentParser,
    recognition_timeout: Duration,
}

impl std::fmt::Debug for OcrPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrPipeline")
            .field("recognizer", &self.recognizer.name())
            .field("recognition_timeout", &self.recognition_timeout)
            .finish_non_exhaustive()
    }
}

impl OcrPipeline {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            parser: FragmentParser::default(),
            recognition_timeout: DEFAULT_RECOGNITION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.recognition_timeout = timeout;
        self
    }

    pub fn with_parser(mut self, parser: FragmentParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    pub async fn run(&self, upload: UploadedImage) -> Result<Vec<ExtractedRecord>, ApiError> {
        let start = Instant::now();
        upload.validate()?;

        // Decode and enhance off the async runtime
        let enhanced = tokio::task::spawn_blocking(move || {
            let (image, info) = decode_image_bytes(&upload.bytes)?;
            debug!(
                "Decoded {:?} image: {}x{}, {} bytes",
                info.format, info.width, info.height, info.size_bytes
            );
            Ok::<_, ApiError>(enhance::preprocess(&image))
        })
        .await
        .map_err(|e| ApiError::from(RecognitionError::WorkerFailed(e.to_string())))??;

        debug!(
            "Preprocessed image: {}x{}",
            enhanced.width(),
            enhanced.height()
        );

        let fragments = tokio::time::timeout(
            self.recognition_timeout,
            self.recognizer.recognize(enhanced),
        )
        .await
        .map_err(|_| RecognitionError::Timeout(self.recognition_timeout))??;

        debug!(
            "{} returned {} fragments",
            self.recognizer.name(),
            fragments.len()
        );

        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        let parsed = self.parser.parse(&texts);
        debug!("Normalized text: {:?}", parsed.normalized);

        info!(
            "OCR complete: {} fragments, {} records, {}ms",
            fragments.len(),
            parsed.records.len(),
            start.elapsed().as_millis()
        );

        Ok(parsed.records)
    }
}

/// Build the process-wide recognizer according to the init policy
///
/// Eager loading fails here when the models cannot be loaded. Lazy loading
/// defers that failure to the first request.
pub async fn build_recognizer(config: &ServiceConfig) -> anyhow::Result<Arc<dyn TextRecognizer>> {
    let model_config = config.model_config();

    match config.model_init {
        InitPolicy::Eager => {
            info!("Loading PaddleOCR models at startup");
            let model = PaddleOcrModel::load(model_config).await?;
            Ok(Arc::new(model))
        }
        InitPolicy::Lazy => {
            info!("PaddleOCR models will load on first request");
            let lazy = LazyRecognizer::new("paddleocr", move || {
                let model_config = model_config.clone();
                async move {
                    let model = PaddleOcrModel::load(model_config).await?;
                    Ok::<_, RecognitionError>(Arc::new(model) as Arc<dyn TextRecognizer>)
                }
            });
            Ok(Arc::new(lazy))
        }
    }
}
