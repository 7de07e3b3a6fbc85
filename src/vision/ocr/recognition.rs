// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! Reads the text content of one cropped region with CTC greedy decoding.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array4, ArrayViewD, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::{REC_INPUT_HEIGHT, REC_MIN_WIDTH};

/// Recognized text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean per-character confidence (0.0-1.0)
    pub confidence: f32,
}

impl RecognizedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// CTC character table: index 0 is the blank token
#[derive(Debug, Clone)]
pub struct CharDictionary {
    chars: Vec<char>,
}

impl CharDictionary {
    /// Build from dictionary file contents, one character per line
    ///
    /// A trailing space entry is appended when the file does not list one.
    pub fn parse(contents: &str) -> Self {
        let mut chars = vec![' '];
        chars.extend(contents.lines().filter_map(|line| line.chars().next()));
        if !chars[1..].contains(&' ') {
            chars.push(' ');
        }
        Self { chars }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary: {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.len() <= 1
    }

    fn get(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Greedy CTC decoding of a [seq_len, num_classes] score matrix
    ///
    /// Takes the best class per timestep, collapses repeats and drops blanks.
    pub fn decode(&self, scores: ArrayViewD<f32>) -> Result<RecognizedText> {
        let scores = match scores.ndim() {
            3 => scores.index_axis_move(Axis(0), 0),
            2 => scores,
            _ => anyhow::bail!("Unexpected recognition output shape: {:?}", scores.shape()),
        };
        let scores = scores
            .into_dimensionality::<Ix2>()
            .context("Unexpected recognition output shape")?;

        let mut text = String::new();
        let mut total = 0.0f32;
        let mut kept = 0usize;
        let mut previous: Option<usize> = None;

        for step in scores.rows() {
            let (best, prob) = step
                .iter()
                .copied()
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |acc, (i, p)| {
                    if p > acc.1 {
                        (i, p)
                    } else {
                        acc
                    }
                });

            if best != 0 && previous != Some(best) {
                if let Some(ch) = self.get(best) {
                    text.push(ch);
                    total += prob;
                    kept += 1;
                }
            }
            previous = (best != 0).then_some(best);
        }

        let confidence = if kept == 0 {
            0.0
        } else {
            (total / kept as f32).clamp(0.0, 1.0)
        };

        Ok(RecognizedText { text, confidence })
    }
}

/// PaddleOCR text recognition model (CPU-only)
#[derive(Clone)]
pub struct OcrRecognitionModel {
    /// ONNX Runtime session, one inference at a time
    session: Arc<Mutex<Session>>,
    dictionary: Arc<CharDictionary>,
    input_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load the recognition model (rec_model.onnx) and its dictionary
    pub fn new<P: AsRef<Path>>(model_path: P, dict_path: P, intra_threads: usize) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }
        if !dict_path.exists() {
            anyhow::bail!(
                "OCR character dictionary not found: {}",
                dict_path.display()
            );
        }

        let dictionary = CharDictionary::load(dict_path)?;
        info!(
            "Loaded character dictionary with {} characters",
            dictionary.len()
        );

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
                    "Failed to load OCR recognition model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        debug!("Recognition model loaded - input: {}", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            dictionary: Arc::new(dictionary),
            input_name,
        })
    }

    /// Recognize text from a [1, 3, 48, W] tensor
    pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
        let shape = input.shape();
        if shape[0] != 1
            || shape[1] != 3
            || shape[2] != REC_INPUT_HEIGHT as usize
            || shape[3] < REC_MIN_WIDTH as usize
        {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, W>={}]",
                shape,
                REC_INPUT_HEIGHT,
                REC_MIN_WIDTH
            );
        }

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Recognition session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Recognition inference failed")?;

        let scores = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        self.dictionary.decode(scores)
    }
}
