// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Collapse recognized fragments into a single filtered string

use std::sync::Arc;

use super::policy::{ConfusablePolicy, DisplayFontPolicy};

/// Check whether a character may survive into pattern matching
///
/// ASCII letters and digits, ',', '.', whitespace and the degree signs.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, ',' | '.' | '°' | 'º')
}

/// Joins fragments and strips everything outside the expected vocabulary
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    policy: Arc<dyn ConfusablePolicy>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(DisplayFontPolicy))
    }
}

impl TextNormalizer {
    pub fn new(policy: Arc<dyn ConfusablePolicy>) -> Self {
        Self { policy }
    }

    /// Normalize fragments in adapter order
    ///
    /// Steps:
    /// 1. Join with a single space
    /// 2. Apply the confusable policy (unit variants, blanked strokes)
    /// 3. Drop characters outside the allowed set
    /// 4. Collapse whitespace runs and trim
    pub fn normalize<S: AsRef<str>>(&self, fragments: &[S]) -> String {
        let joined = fragments
            .iter()
            .map(|f| f.as_ref())
            .collect::<Vec<_>>()
            .join(" ");

        let scrubbed = self.policy.scrub(&joined);

        let filtered: String = scrubbed.chars().filter(|c| is_allowed_char(*c)).collect();

        filtered.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
