// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Finds text regions in the preprocessed image and returns them in reading
//! order (rows top-to-bottom, left-to-right within a row).

use anyhow::{anyhow, Context, Result};
use ndarray::{Array4, ArrayView2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::OCR_INPUT_SIZE;

/// Expected input size for detection model
pub const DETECTION_INPUT_SIZE: u32 = OCR_INPUT_SIZE;

/// Default probability threshold for text pixels
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.3;

/// Regions with fewer text pixels than this are discarded
pub const MIN_REGION_PIXELS: usize = 10;

/// A detected text box in detection input space
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean text probability over the region (0.0-1.0)
    pub confidence: f32,
}

impl TextBox {
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.confidence > 0.0
    }

    fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// PaddleOCR text detection model (CPU-only)
#[derive(Clone)]
pub struct OcrDetectionModel {
    /// ONNX Runtime session, one inference at a time
    session: Arc<Mutex<Session>>,
    input_name: String,
    threshold: f32,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the detection model (det_model.onnx)
    pub fn new<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load OCR detection model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        debug!("Detection model loaded - input: {}", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            threshold: DEFAULT_DETECTION_THRESHOLD,
        })
    }

    /// Set the probability threshold for text pixels
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Run detection on a [1, 3, H, W] tensor
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextBox>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }
        let (input_height, input_width) = (shape[2], shape[3]);

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        // Probability map: [1, 1, H, W] or [1, H, W]
        let dims = output.shape();
        if dims.len() < 2 {
            anyhow::bail!("Unexpected detection output shape: {:?}", dims);
        }
        let (map_height, map_width) = (dims[dims.len() - 2], dims[dims.len() - 1]);
        let map = output
            .to_shape((map_height, map_width))
            .context("Unexpected detection output shape")?;

        let boxes = boxes_from_probability_map(
            map.view(),
            self.threshold,
            input_width as f32 / map_width as f32,
            input_height as f32 / map_height as f32,
        );

        debug!("Detected {} text regions", boxes.len());

        Ok(reading_order(boxes))
    }
}

/// Threshold a probability map and flood-fill connected text regions
///
/// `scale_x` / `scale_y` map probability-map cells to detection input pixels.
pub fn boxes_from_probability_map(
    map: ArrayView2<f32>,
    threshold: f32,
    scale_x: f32,
    scale_y: f32,
) -> Vec<TextBox> {
    let (height, width) = map.dim();
    let mut visited = vec![false; height * width];
    let mut boxes = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || map[[y, x]] < threshold {
                continue;
            }

            let region = flood_fill(&map, &mut visited, x, y, threshold);
            if region.count < MIN_REGION_PIXELS {
                continue;
            }

            boxes.push(TextBox {
                x: region.min_x as f32 * scale_x,
                y: region.min_y as f32 * scale_y,
                width: (region.max_x - region.min_x + 1) as f32 * scale_x,
                height: (region.max_y - region.min_y + 1) as f32 * scale_y,
                confidence: region.sum / region.count as f32,
            });
        }
    }

    boxes
}

struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    count: usize,
    sum: f32,
}

/// 4-connected flood fill from (start_x, start_y)
fn flood_fill(
    map: &ArrayView2<f32>,
    visited: &mut [bool],
    start_x: usize,
    start_y: usize,
    threshold: f32,
) -> Region {
    let (height, width) = map.dim();
    let mut stack = vec![(start_x, start_y)];
    let mut region = Region {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
        count: 0,
        sum: 0.0,
    };

    while let Some((x, y)) = stack.pop() {
        let idx = y * width + x;
        if visited[idx] {
            continue;
        }
        let prob = map[[y, x]];
        if prob < threshold {
            continue;
        }

        visited[idx] = true;
        region.count += 1;
        region.sum += prob;
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    region
}

/// Sort boxes into rows, then left-to-right within each row
///
/// A box joins the current row when its vertical center falls within the
/// row's first box.
pub fn reading_order(mut boxes: Vec<TextBox>) -> Vec<TextBox> {
    boxes.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut rows: Vec<Vec<TextBox>> = Vec::new();
    for text_box in boxes {
        match rows.last_mut() {
            Some(row) if text_box.center_y() <= row[0].y + row[0].height => row.push(text_box),
            _ => rows.push(vec![text_box]),
        }
    }

    rows.into_iter()
        .flat_map(|mut row| {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            row
        })
        .collect()
}
