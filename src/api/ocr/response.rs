// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR response types

use serde::{Deserialize, Serialize};

use crate::extraction::ExtractedRecord;

/// Response body for POST /ocr
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    /// Zone / temperature pairs in text order
    pub results: Vec<ExtractedRecord>,
}

impl OcrResponse {
    pub fn new(results: Vec<ExtractedRecord>) -> Self {
        Self { results }
    }
}
