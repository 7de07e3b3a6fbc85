// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Post-processing of recognized text into zone / temperature records
//!
//! Components:
//! - `policy` - Confusable-character corrections (swappable)
//! - `normalizer` - Fragment joining and character filtering
//! - `extractor` - Zone and temperature pattern scans, positional pairing

pub mod extractor;
pub mod normalizer;
pub mod policy;

use std::sync::Arc;

pub use extractor::{ExtractedRecord, RecordExtractor, TemperatureValue, ZoneCode};
pub use normalizer::TextNormalizer;
pub use policy::{ConfusablePolicy, DisplayFontPolicy};

/// Result of parsing one set of recognized fragments
#[derive(Debug, Clone)]
pub struct ParsedText {
    /// Joined and filtered text the patterns ran against
    pub normalized: String,
    /// Positionally paired records
    pub records: Vec<ExtractedRecord>,
}

/// Normalizer and extractor sharing one confusable policy
#[derive(Debug, Clone)]
pub struct FragmentParser {
    normalizer: TextNormalizer,
    extractor: RecordExtractor,
}

impl Default for FragmentParser {
    fn default() -> Self {
        Self::new(Arc::new(DisplayFontPolicy))
    }
}

impl FragmentParser {
    pub fn new(policy: Arc<dyn ConfusablePolicy>) -> Self {
        Self {
            normalizer: TextNormalizer::new(policy.clone()),
            extractor: RecordExtractor::new(policy),
        }
    }

    pub fn parse<S: AsRef<str>>(&self, fragments: &[S]) -> ParsedText {
        let normalized = self.normalizer.normalize(fragments);
        let records = self.extractor.extract(&normalized);
        ParsedText {
            normalized,
            records,
        }
    }
}
